//! MCP23008 GPIO Expander Driver
//!
//! A platform-agnostic driver for the Microchip MCP23008 8-bit I2C GPIO expander.
//!
//! The MCP23008 provides eight GPIO pins behind a single I2C device address.
//! Each pin has a configurable direction, an optional weak pull-up, an input
//! polarity inversion bit, and interrupt-on-change detection. All pin state
//! lives in eleven 8-bit registers; this driver translates pin-level
//! operations into the corresponding register transactions. Nothing is cached
//! host-side: every call is live bus traffic.
//!
//! # Features
//!
//! - `no_std` compatible
//! - Uses `embedded-hal` traits for portability
//! - Whole-port (byte) or single-pin operations
//! - Interrupt-on-change configuration (change / rising / falling)
//! - `async`: async driver via `embedded-hal-async` (see [`async_impl`])
//! - `defmt`: `defmt::Format` derives on the public types
//!
//! # Example
//!
//! ```ignore
//! use mcp23008::{Mcp23008, PinMode, GP3, MCP23008_ADDRESS};
//! use embedded_hal::digital::PinState;
//! # let i2c = todo!();
//!
//! // Create device with I2C bus and default address
//! let mut expander = Mcp23008::new(i2c, MCP23008_ADDRESS);
//!
//! // Select byte mode and enable pull-ups
//! expander.init().unwrap();
//!
//! // Configure pin 0 as output and drive it high
//! expander.pin_mode(0, PinMode::Output, false).unwrap();
//! expander.digital_write(0, PinState::High).unwrap();
//!
//! // Configure pin 3 as input with pull-up and read it
//! expander.pin_mode(GP3, PinMode::InputPullup, false).unwrap();
//! let state = expander.digital_read(GP3).unwrap();
//! ```
//!
//! # Bus sharing
//!
//! The driver owns whatever `I2c` implementation it is given; to put several
//! devices on one bus, hand each driver a shared-bus wrapper (or `&mut` to
//! the bus) and serialize access yourself. The driver performs no locking of
//! its own.

#![no_std]

use embedded_hal::digital::PinState;
use embedded_hal::i2c::{AddressMode, I2c};

#[cfg(feature = "async")]
pub mod async_impl;

/// Default I2C address of the MCP23008 (A2..A0 strapped low).
pub const MCP23008_ADDRESS: u8 = 0x20;

/// Logical name of pin 0 (bit 0 of every port register).
pub const GP0: u8 = 0;
/// Logical name of pin 1.
pub const GP1: u8 = 1;
/// Logical name of pin 2.
pub const GP2: u8 = 2;
/// Logical name of pin 3.
pub const GP3: u8 = 3;
/// Logical name of pin 4.
pub const GP4: u8 = 4;
/// Logical name of pin 5.
pub const GP5: u8 = 5;
/// Logical name of pin 6.
pub const GP6: u8 = 6;
/// Logical name of pin 7 (bit 7 of every port register).
pub const GP7: u8 = 7;

/// IOCON bit masks.
///
/// [`Mcp23008::init`](crate::Mcp23008::init) writes [`SEQOP`](self::SEQOP)
/// only; the remaining bits can be composed into a device-mode word and
/// applied with [`Mcp23008::write_register`](crate::Mcp23008::write_register).
/// BANK (bit 7) must stay 0: the register map used by this driver is only
/// valid under BANK=0 addressing.
pub mod iocon {
    /// Disable sequential address pointer increment (byte mode).
    pub const SEQOP: u8 = 1 << 5;
    /// Disable slew rate control on SDA.
    pub const DISSLW: u8 = 1 << 4;
    /// Hardware address enable (MCP23S08 SPI variant only; ignored on I2C).
    pub const HAEN: u8 = 1 << 3;
    /// Configure the INT pin as open-drain.
    pub const ODR: u8 = 1 << 2;
    /// INT pin active-high instead of active-low (ignored when ODR is set).
    pub const INTPOL: u8 = 1 << 1;
}

/// MCP23008 register addresses, valid for IOCON.BANK = 0.
///
/// See "3.2.1 Byte mode and Sequential mode".
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Controls the direction of the data I/O. 1 = input, 0 = output.
    IODIR = 0x00,
    /// Input polarity inversion per pin.
    IPOL = 0x01,
    /// Interrupt-on-change enable per pin.
    GPINTEN = 0x02,
    /// Default comparison value for interrupt-on-change.
    DEFVAL = 0x03,
    /// Compare mode for interrupt-on-change (DEFVAL vs previous value).
    INTCON = 0x04,
    /// Device configuration word.
    IOCON = 0x05,
    /// Pull-up enable per pin, effective on inputs only.
    GPPU = 0x06,
    /// Interrupt flag: which pin(s) have a pending condition (read-only).
    INTF = 0x07,
    /// Port value captured at the time of the interrupt (read-only).
    INTCAP = 0x08,
    /// Port value.
    GPIO = 0x09,
    /// Output latches.
    OLAT = 0x0A,
}

impl Register {
    /// Register address on the bus.
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// Pin mode for [`Mcp23008::pin_mode`].
///
/// These follow the familiar host-platform convention. The MCP23008's native
/// IODIR polarity is the inverse (an IODIR bit of 1 means *input*); the
/// mapping between the two conventions lives in [`PinMode::iodir_bit`] and
/// [`PinMode::gppu_bit`]. The whole-port [`Mcp23008::port_mode`] exposes the
/// native convention unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Pin drives its output latch.
    Output,
    /// High-impedance input.
    Input,
    /// Input with the weak pull-up enabled.
    InputPullup,
}

impl PinMode {
    /// Native IODIR bit for this mode: 1 = input, 0 = output.
    pub const fn iodir_bit(self) -> bool {
        matches!(self, PinMode::Input | PinMode::InputPullup)
    }

    /// GPPU bit for this mode: 1 = pull-up enabled.
    pub const fn gppu_bit(self) -> bool {
        matches!(self, PinMode::InputPullup)
    }
}

/// Edge-detection mode for [`Mcp23008::interrupt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptMode {
    /// Interrupt on any change from the previous pin value.
    Change,
    /// Interrupt on a low-to-high transition.
    Rising,
    /// Interrupt on a high-to-low transition.
    Falling,
}

impl InterruptMode {
    /// Register bytes arming this mode: (DEFVAL, INTCON).
    ///
    /// DEFVAL is `None` for [`Change`](InterruptMode::Change): the register
    /// is ignored while INTCON is zero, so it is left untouched. For the edge
    /// modes, INTCON selects comparison against DEFVAL, and DEFVAL holds the
    /// reference the pin must depart from (0 = rising triggers, 1 = falling
    /// triggers).
    const fn register_values(self) -> (Option<u8>, u8) {
        match self {
            InterruptMode::Change => (None, 0x00),
            InterruptMode::Rising => (Some(0x00), 0xFF),
            InterruptMode::Falling => (Some(0xFF), 0xFF),
        }
    }
}

/// Errors that can occur when interacting with the MCP23008.
///
/// Bus failures carry the register that was being accessed. Multi-register
/// operations ([`Mcp23008::port_mode`], [`Mcp23008::pin_mode`],
/// [`Mcp23008::interrupt`]) are not atomic: on a mid-sequence failure the
/// registers written before the reported one have already been updated.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// I2C write to the given register failed.
    Write(Register, E),
    /// I2C read of the given register failed.
    Read(Register, E),
    /// Pin index outside 0..=7.
    InvalidPin(u8),
}

/// MCP23008 driver instance.
///
/// Manages communication with one MCP23008 over I2C. Distinct instances at
/// distinct addresses can share a bus; see the crate docs for the sharing
/// contract.
pub struct Mcp23008<A: AddressMode, I2C: I2c<A>> {
    i2c: I2C,
    addr: A,
}

impl<A, I2C> Mcp23008<A, I2C>
where
    A: AddressMode + Copy,
    I2C: I2c<A>,
{
    /// Creates a new driver instance for the device at `addr`.
    ///
    /// The address is fixed for the lifetime of the instance. No bus traffic
    /// happens until the first operation; call [`init`](Self::init) before
    /// any pin operation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// # use mcp23008::{Mcp23008, MCP23008_ADDRESS};
    /// # let i2c = todo!();
    /// let expander = Mcp23008::new(i2c, MCP23008_ADDRESS);
    /// ```
    pub fn new(i2c: I2C, addr: A) -> Self {
        Self { i2c, addr }
    }

    /// Consumes the driver and returns the I2C bus.
    pub fn destroy(self) -> I2C {
        self.i2c
    }

    /// Initializes the device with the default configuration.
    ///
    /// Writes IOCON with SEQOP set (byte mode; the register map requires
    /// BANK=0 addressing) and enables pull-ups on all eight pins. Pull-ups
    /// only take effect on pins later configured as inputs.
    ///
    /// # Errors
    ///
    /// Returns an error if either register write fails; a failure after the
    /// IOCON write leaves GPPU at its previous value.
    pub fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_register(Register::IOCON, iocon::SEQOP)?;
        self.write_register(Register::GPPU, 0xFF)
    }

    /// Writes a single register.
    ///
    /// One bus write of the register address followed by the data byte. Not
    /// retried; the bus error is surfaced unmodified inside [`Error::Write`].
    pub fn write_register(&mut self, reg: Register, value: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(self.addr, &[reg.addr(), value])
            .map_err(|e| Error::Write(reg, e))
    }

    /// Reads a single register.
    pub fn read_register(&mut self, reg: Register) -> Result<u8, Error<I2C::Error>> {
        let mut buffer = [0u8; 1];
        self.i2c
            .write_read(self.addr, &[reg.addr()], &mut buffer)
            .map_err(|e| Error::Read(reg, e))?;
        Ok(buffer[0])
    }

    /// Configures direction, pull-ups and input polarity for the whole port.
    ///
    /// Writes IODIR := `directions`, GPPU := `pullups`, IPOL := `polarity`,
    /// in that order. `directions` uses the chip's native convention: bit
    /// set = input, bit clear = output (the opposite of
    /// [`pin_mode`](Self::pin_mode), which follows the platform convention).
    /// "All inputs, all pulled up, no inversion" is
    /// `port_mode(0xFF, 0xFF, 0x00)`.
    ///
    /// # Errors
    ///
    /// The three writes are not atomic; the error names the register whose
    /// write failed, and earlier registers in the sequence are already
    /// updated.
    pub fn port_mode(
        &mut self,
        directions: u8,
        pullups: u8,
        polarity: u8,
    ) -> Result<(), Error<I2C::Error>> {
        self.write_register(Register::IODIR, directions)?;
        self.write_register(Register::GPPU, pullups)?;
        self.write_register(Register::IPOL, polarity)
    }

    /// Writes all eight pin states at once.
    ///
    /// Bit set = drive logic-high. Bits of pins configured as inputs are
    /// ignored by the hardware.
    pub fn write_port(&mut self, value: u8) -> Result<(), Error<I2C::Error>> {
        self.write_register(Register::GPIO, value)
    }

    /// Reads all eight pin states at once, 1 = logic-high.
    pub fn read_port(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.read_register(Register::GPIO)
    }

    /// Configures a single pin without disturbing its siblings.
    ///
    /// Reads IODIR, GPPU and IPOL, changes only bit `pin` (direction and
    /// pull-up per `mode`, polarity inversion per `inverted`) and writes
    /// the three registers back. With `inverted` set, the pin reads as
    /// logic-high when the electrical level is low.
    ///
    /// The read-modify-write sequence is two transactions per register and
    /// is not atomic with respect to concurrent access to the same device;
    /// callers reconfiguring pins from multiple contexts must serialize.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPin`] for `pin > 7` without touching the bus.
    pub fn pin_mode(
        &mut self,
        pin: u8,
        mode: PinMode,
        inverted: bool,
    ) -> Result<(), Error<I2C::Error>> {
        if pin > GP7 {
            return Err(Error::InvalidPin(pin));
        }
        let mask = 1u8 << pin;

        let iodir = self.read_register(Register::IODIR)?;
        let gppu = self.read_register(Register::GPPU)?;
        let ipol = self.read_register(Register::IPOL)?;

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

        self.write_register(Register::IODIR, iodir)?;
        self.write_register(Register::GPPU, gppu)?;
        self.write_register(Register::IPOL, ipol)
    }

    /// Sets the output state of a single pin.
    ///
    /// Read-modify-write of GPIO; a GPIO write lands in the output latch, so
    /// pins configured as inputs are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPin`] for `pin > 7` without touching the bus.
    pub fn digital_write(&mut self, pin: u8, state: PinState) -> Result<(), Error<I2C::Error>> {
        if pin > GP7 {
            return Err(Error::InvalidPin(pin));
        }

        let gpio = self.read_register(Register::GPIO)?;
        let value = match state {
            PinState::High => gpio | (1 << pin),
            PinState::Low => gpio & !(1 << pin),
        };
        self.write_register(Register::GPIO, value)
    }

    /// Reads the state of a single pin, regardless of its direction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPin`] for `pin > 7` without touching the bus.
    pub fn digital_read(&mut self, pin: u8) -> Result<PinState, Error<I2C::Error>> {
        if pin > GP7 {
            return Err(Error::InvalidPin(pin));
        }

        let gpio = self.read_register(Register::GPIO)?;
        Ok(PinState::from(gpio & (1 << pin) != 0))
    }

    /// Arms interrupt-on-change for all eight pins in the given mode.
    ///
    /// Writes the edge configuration (DEFVAL for the edge modes, then
    /// INTCON) before enabling GPINTEN, so no pin is armed against a stale
    /// compare setup. The INT line asserts until the condition is cleared by
    /// [`clear_interrupts`](Self::clear_interrupts) or a GPIO read.
    ///
    /// Arming a subset of pins is possible by writing GPINTEN directly with
    /// [`write_register`](Self::write_register) afterwards.
    pub fn interrupt(&mut self, mode: InterruptMode) -> Result<(), Error<I2C::Error>> {
        let (defval, intcon) = mode.register_values();
        if let Some(defval) = defval {
            self.write_register(Register::DEFVAL, defval)?;
        }
        self.write_register(Register::INTCON, intcon)?;
        self.write_register(Register::GPINTEN, 0xFF)
    }

    /// Disables interrupt-on-change for all pins. Idempotent.
    pub fn disable_interrupt(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_register(Register::GPINTEN, 0x00)
    }

    /// Reads which pin(s) have a pending interrupt condition.
    ///
    /// Returns the INTF bitmap. Does not clear the condition.
    pub fn interrupted_by(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.read_register(Register::INTF)
    }

    /// Clears the pending interrupt and returns the captured port snapshot.
    ///
    /// Reads INTCAP, the port value latched at the moment the interrupt
    /// occurred. Per the hardware contract this read de-asserts the INT line
    /// and re-arms edge detection for the next event.
    pub fn clear_interrupts(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.read_register(Register::INTCAP)
    }
}
