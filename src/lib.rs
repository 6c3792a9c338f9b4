//! Buffer-oriented Modbus codec.
//!
//! This crate packs Modbus requests/responses from a structured in-memory
//! description into a byte slice, and parses byte slices back into that
//! description, for three framing variants: RTU, ASCII, and TCP (MBAP).
//!
//! Transport I/O (serial ports, sockets), connection management, retry, and
//! timeouts are not part of this crate: callers own the bytes. Address-space
//! ownership (which coil/register addresses a server actually serves) is
//! delegated to caller-supplied [`access::AccessControl`] predicates.
//!
//! ```
//! use modbus_codec::{Facade, Protocol};
//!
//! let mut modbus: Facade<()> = Facade::new();
//! modbus.header_mut().set_rtu(0x01);
//! modbus.argument_mut().set_function_code(0x01);
//! modbus.argument_mut().set_register_address(0x0000);
//! modbus.argument_mut().set_quantity(0x0007);
//!
//! let mut out = [0u8; 256];
//! modbus.pack_request(&mut out).unwrap();
//! assert_eq!(&out[..modbus.result().ret_len() as usize], &[0x01, 0x01, 0x00, 0x00, 0x00, 0x07, 0x7D, 0xC8]);
//! ```
#![cfg_attr(not(test), no_std)]

#[cfg(test)]
extern crate std;

pub mod access;
pub mod adu;
pub mod argument;
pub mod buffer;
pub mod checksum;
pub mod convert;
pub mod error;
pub mod facade;
pub mod header;
pub mod pdu;
pub mod result;

pub use access::AccessControl;
pub use argument::Argument;
pub use error::{ModbusException, TransportError};
pub use facade::Facade;
pub use header::{Header, Protocol};
pub use result::ModbusResult;

/// Byte order used for multi-byte register/word fields (Modbus is always big-endian on the wire).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Endian {
    Big,
    Little,
}

/// Largest payload (register or packed-bit) a single PDU can carry.
///
/// `max(2000 bits -> 250 bytes, 125 registers -> 250 bytes, 1968 bits -> 246 bytes)`.
pub const MAX_PAYLOAD: usize = 250;

/// Largest ADU this crate will frame or accept, matching the façade's pack capacity (§4.6).
pub const MAX_ADU: usize = 1024;

/// Largest RTU/ASCII/TCP working frame before ASCII hex expansion (§4.5).
pub const MAX_WORK_ADU: usize = 256;
