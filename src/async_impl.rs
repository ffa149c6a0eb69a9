//! Async implementation of the MCP23008 driver.
//!
//! This module provides an async version of the driver that uses
//! `embedded-hal-async` traits. Enable the `async` feature to use this
//! module. Every method mirrors its blocking counterpart on
//! [`Mcp23008`](crate::Mcp23008) and must be `.await`ed.
//!
//! # Example
//!
//! ```ignore
//! use mcp23008::{async_impl::Mcp23008Async, PinMode, MCP23008_ADDRESS};
//! use embedded_hal::digital::PinState;
//! # let i2c = todo!(); // async I2C
//!
//! async fn configure_gpio() {
//!     let mut expander = Mcp23008Async::new(i2c, MCP23008_ADDRESS);
//!     expander.init().await.unwrap();
//!     expander.pin_mode(0, PinMode::Output, false).await.unwrap();
//!     expander.digital_write(0, PinState::High).await.unwrap();
//! }
//! ```

use embedded_hal::digital::PinState;
use embedded_hal::i2c::AddressMode;
use embedded_hal_async::i2c::I2c;

use crate::{iocon, Error, InterruptMode, PinMode, Register, GP7};

/// Async MCP23008 driver instance.
///
/// Manages asynchronous communication with an MCP23008 over I2C. The
/// register semantics, error contract and non-atomicity caveats are
/// identical to the blocking [`Mcp23008`](crate::Mcp23008).
pub struct Mcp23008Async<A: AddressMode, I2C: I2c<A>> {
    i2c: I2C,
    addr: A,
}

impl<A, I2C> Mcp23008Async<A, I2C>
where
    A: AddressMode + Copy,
    I2C: I2c<A>,
{
    /// Creates a new async driver instance for the device at `addr`.
    pub fn new(i2c: I2C, addr: A) -> Self {
        Self { i2c, addr }
    }

    /// Consumes the driver and returns the I2C bus.
    pub fn destroy(self) -> I2C {
        self.i2c
    }

    /// Initializes the device: byte mode (IOCON.SEQOP) and all pull-ups on.
    pub async fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_register(Register::IOCON, iocon::SEQOP).await?;
        self.write_register(Register::GPPU, 0xFF).await
    }

    /// Writes a single register.
    pub async fn write_register(
        &mut self,
        reg: Register,
        value: u8,
    ) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(self.addr, &[reg.addr(), value])
            .await
            .map_err(|e| Error::Write(reg, e))
    }

    /// Reads a single register.
    pub async fn read_register(&mut self, reg: Register) -> Result<u8, Error<I2C::Error>> {
        let mut buffer = [0u8; 1];
        self.i2c
            .write_read(self.addr, &[reg.addr()], &mut buffer)
            .await
            .map_err(|e| Error::Read(reg, e))?;
        Ok(buffer[0])
    }

    /// Configures direction, pull-ups and input polarity for the whole port.
    ///
    /// Native IODIR convention (bit set = input); writes IODIR, GPPU, IPOL
    /// in that order, not atomically.
    pub async fn port_mode(
        &mut self,
        directions: u8,
        pullups: u8,
        polarity: u8,
    ) -> Result<(), Error<I2C::Error>> {
        self.write_register(Register::IODIR, directions).await?;
        self.write_register(Register::GPPU, pullups).await?;
        self.write_register(Register::IPOL, polarity).await
    }

    /// Writes all eight pin states at once.
    pub async fn write_port(&mut self, value: u8) -> Result<(), Error<I2C::Error>> {
        self.write_register(Register::GPIO, value).await
    }

    /// Reads all eight pin states at once.
    pub async fn read_port(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.read_register(Register::GPIO).await
    }

    /// Configures a single pin without disturbing its siblings.
    ///
    /// See [`Mcp23008::pin_mode`](crate::Mcp23008::pin_mode) for the
    /// convention translation and the read-modify-write caveat.
    pub async fn pin_mode(
        &mut self,
        pin: u8,
        mode: PinMode,
        inverted: bool,
    ) -> Result<(), Error<I2C::Error>> {
        if pin > GP7 {
            return Err(Error::InvalidPin(pin));
        }
        let mask = 1u8 << pin;

        let iodir = self.read_register(Register::IODIR).await?;
        let gppu = self.read_register(Register::GPPU).await?;
        let ipol = self.read_register(Register::IPOL).await?;

        let iodir = if mode.iodir_bit() {
            iodir | mask
        } else {
            iodir & !mask
        };
        let gppu = if mode.gppu_bit() {
            gppu | mask
        } else {
            gppu & !mask
        };
        let ipol = if inverted { ipol | mask } else { ipol & !mask };

        self.write_register(Register::IODIR, iodir).await?;
        self.write_register(Register::GPPU, gppu).await?;
        self.write_register(Register::IPOL, ipol).await
    }

    /// Sets the output state of a single pin (read-modify-write of GPIO).
    pub async fn digital_write(
        &mut self,
        pin: u8,
        state: PinState,
    ) -> Result<(), Error<I2C::Error>> {
        if pin > GP7 {
            return Err(Error::InvalidPin(pin));
        }

        let gpio = self.read_register(Register::GPIO).await?;
        let value = match state {
            PinState::High => gpio | (1 << pin),
            PinState::Low => gpio & !(1 << pin),
        };
        self.write_register(Register::GPIO, value).await
    }

    /// Reads the state of a single pin.
    pub async fn digital_read(&mut self, pin: u8) -> Result<PinState, Error<I2C::Error>> {
        if pin > GP7 {
            return Err(Error::InvalidPin(pin));
        }

        let gpio = self.read_register(Register::GPIO).await?;
        Ok(PinState::from(gpio & (1 << pin) != 0))
    }

    /// Arms interrupt-on-change for all eight pins in the given mode.
    ///
    /// Edge configuration first, GPINTEN last.
    pub async fn interrupt(&mut self, mode: InterruptMode) -> Result<(), Error<I2C::Error>> {
        let (defval, intcon) = mode.register_values();
        if let Some(defval) = defval {
            self.write_register(Register::DEFVAL, defval).await?;
        }
        self.write_register(Register::INTCON, intcon).await?;
        self.write_register(Register::GPINTEN, 0xFF).await
    }

    /// Disables interrupt-on-change for all pins. Idempotent.
    pub async fn disable_interrupt(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_register(Register::GPINTEN, 0x00).await
    }

    /// Reads the INTF bitmap without clearing the pending condition.
    pub async fn interrupted_by(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.read_register(Register::INTF).await
    }

    /// Reads INTCAP, clearing the interrupt and returning the port snapshot.
    pub async fn clear_interrupts(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.read_register(Register::INTCAP).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GP3, MCP23008_ADDRESS};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    #[allow(unused_imports)]
    extern crate std;

    const ADDR: u8 = MCP23008_ADDRESS;

    #[tokio::test]
    async fn async_init_selects_byte_mode_then_enables_pullups() {
        let expectations = [
            I2cTransaction::write(ADDR, [0x05, 0b0010_0000].to_vec()),
            I2cTransaction::write(ADDR, [0x06, 0xFF].to_vec()),
        ];

        let i2c = I2cMock::new(&expectations);
        let mut dev = Mcp23008Async::new(i2c, ADDR);

        dev.init().await.unwrap();

        let mut i2c = dev.destroy();
        i2c.done();
    }

    #[tokio::test]
    async fn async_port_mode_writes_three_registers() {
        let expectations = [
            I2cTransaction::write(ADDR, [0x00, 0xFF].to_vec()),
            I2cTransaction::write(ADDR, [0x06, 0xFF].to_vec()),
            I2cTransaction::write(ADDR, [0x01, 0x00].to_vec()),
        ];

        let i2c = I2cMock::new(&expectations);
        let mut dev = Mcp23008Async::new(i2c, ADDR);

        dev.port_mode(0xFF, 0xFF, 0x00).await.unwrap();

        let mut i2c = dev.destroy();
        i2c.done();
    }

    #[tokio::test]
    async fn async_digital_write_sets_pin_high() {
        let expectations = [
            I2cTransaction::write_read(ADDR, [0x09].to_vec(), [0b0000_0000].to_vec()),
            I2cTransaction::write(ADDR, [0x09, 0b0000_1000].to_vec()),
        ];

        let i2c = I2cMock::new(&expectations);
        let mut dev = Mcp23008Async::new(i2c, ADDR);

        dev.digital_write(GP3, PinState::High).await.unwrap();

        let mut i2c = dev.destroy();
        i2c.done();
    }

    #[tokio::test]
    async fn async_digital_read_returns_pin_state() {
        let expectations = [I2cTransaction::write_read(
            ADDR,
            [0x09].to_vec(),
            [0b0000_1000].to_vec(),
        )];

        let i2c = I2cMock::new(&expectations);
        let mut dev = Mcp23008Async::new(i2c, ADDR);

        assert_eq!(dev.digital_read(GP3).await.unwrap(), PinState::High);

        let mut i2c = dev.destroy();
        i2c.done();
    }

    #[tokio::test]
    async fn async_pin_mode_input_pullup_configures_three_registers() {
        let expectations = [
            I2cTransaction::write_read(ADDR, [0x00].to_vec(), [0x00].to_vec()),
            I2cTransaction::write_read(ADDR, [0x06].to_vec(), [0x00].to_vec()),
            I2cTransaction::write_read(ADDR, [0x01].to_vec(), [0x00].to_vec()),
            I2cTransaction::write(ADDR, [0x00, 0x08].to_vec()),
            I2cTransaction::write(ADDR, [0x06, 0x08].to_vec()),
            I2cTransaction::write(ADDR, [0x01, 0x00].to_vec()),
        ];

        let i2c = I2cMock::new(&expectations);
        let mut dev = Mcp23008Async::new(i2c, ADDR);

        dev.pin_mode(GP3, PinMode::InputPullup, false).await.unwrap();

        let mut i2c = dev.destroy();
        i2c.done();
    }

    #[tokio::test]
    async fn async_interrupt_falling_writes_edge_config_then_arms() {
        let expectations = [
            I2cTransaction::write(ADDR, [0x03, 0xFF].to_vec()),
            I2cTransaction::write(ADDR, [0x04, 0xFF].to_vec()),
            I2cTransaction::write(ADDR, [0x02, 0xFF].to_vec()),
        ];

        let i2c = I2cMock::new(&expectations);
        let mut dev = Mcp23008Async::new(i2c, ADDR);

        dev.interrupt(InterruptMode::Falling).await.unwrap();

        let mut i2c = dev.destroy();
        i2c.done();
    }

    #[tokio::test]
    async fn async_clear_interrupts_reads_intcap() {
        let expectations = [I2cTransaction::write_read(
            ADDR,
            [0x08].to_vec(),
            [0b0000_1000].to_vec(),
        )];

        let i2c = I2cMock::new(&expectations);
        let mut dev = Mcp23008Async::new(i2c, ADDR);

        assert_eq!(dev.clear_interrupts().await.unwrap(), 0b0000_1000);

        let mut i2c = dev.destroy();
        i2c.done();
    }

    #[tokio::test]
    async fn async_invalid_pin_rejected_without_bus_traffic() {
        let i2c = I2cMock::new(&[]);
        let mut dev = Mcp23008Async::new(i2c, ADDR);

        let err = dev.digital_read(8).await.unwrap_err();
        assert!(matches!(err, Error::InvalidPin(8)));

        let mut i2c = dev.destroy();
        i2c.done();
    }
}
