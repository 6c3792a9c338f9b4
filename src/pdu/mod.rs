//! Per-function-code PDU pack/parse and the dispatcher that selects among them (§4.4).
//!
//! The dispatcher is the direct translation of the reference implementation's
//! `Pack`/`Parse` switch: the function code lives in the argument (for pack)
//! or as the first byte of the current window (for parse, peeked without
//! advancing `last` — every per-code parser re-reads it as part of its own
//! length check). A response pack with a non-zero exception code is diverted
//! to the exception PDU before any function-specific handler runs.

pub mod coil;
pub mod discrete;
pub mod excep;
pub mod hold;
pub mod input;

use crate::access::AccessControl;
use crate::argument::Argument;
use crate::buffer::Buffer;
use crate::error::TransportError;
use crate::result::ModbusResult;

pub const FUNC_READ_COIL: u8 = 0x01;
pub const FUNC_READ_DISCRETE: u8 = 0x02;
pub const FUNC_READ_HOLD: u8 = 0x03;
pub const FUNC_READ_INPUT: u8 = 0x04;
pub const FUNC_WRITE_COIL: u8 = 0x05;
pub const FUNC_WRITE_HOLD: u8 = 0x06;
pub const FUNC_WRITE_COILS: u8 = 0x0F;
pub const FUNC_WRITE_HOLDS: u8 = 0x10;

const SUPPORTED_FUNC_CODES: [u8; 8] = [
    FUNC_READ_COIL,
    FUNC_READ_DISCRETE,
    FUNC_READ_HOLD,
    FUNC_READ_INPUT,
    FUNC_WRITE_COIL,
    FUNC_WRITE_HOLD,
    FUNC_WRITE_COILS,
    FUNC_WRITE_HOLDS,
];

/// Pack a PDU for `arg.function_code()` into `buf`'s current window.
///
/// On a response pack with a pending exception, this diverts to the
/// exception PDU regardless of `arg.function_code()`'s validity.
pub fn pack<const N: usize>(
    result: &mut ModbusResult,
    arg: &Argument,
    buf: &mut Buffer<N>,
    is_request: bool,
) -> Result<u16, TransportError> {
    if !is_request && !result.is_normal() {
        return excep::pack_response(result, arg, buf);
    }

    match arg.function_code() {
        FUNC_READ_COIL => {
            if is_request {
                coil::pack_request_read(arg, buf)
            } else {
                coil::pack_response_read(arg, buf)
            }
        }
        FUNC_WRITE_COIL => {
            if is_request {
                coil::pack_request_write(arg, buf)
            } else {
                coil::pack_response_write(arg, buf)
            }
        }
        FUNC_WRITE_COILS => {
            if is_request {
                coil::pack_request_write_multiple(arg, buf)
            } else {
                coil::pack_response_write_multiple(arg, buf)
            }
        }
        FUNC_READ_DISCRETE => {
            if is_request {
                discrete::pack_request(arg, buf)
            } else {
                discrete::pack_response(arg, buf)
            }
        }
        FUNC_READ_HOLD => {
            if is_request {
                hold::pack_request_read(arg, buf)
            } else {
                hold::pack_response_read(arg, buf)
            }
        }
        FUNC_WRITE_HOLD => {
            if is_request {
                hold::pack_request_write(arg, buf)
            } else {
                hold::pack_response_write(arg, buf)
            }
        }
        FUNC_WRITE_HOLDS => {
            if is_request {
                hold::pack_request_write_multiple(arg, buf)
            } else {
                hold::pack_response_write_multiple(arg, buf)
            }
        }
        FUNC_READ_INPUT => {
            if is_request {
                input::pack_request(arg, buf)
            } else {
                input::pack_response(arg, buf)
            }
        }
        _ => Err(TransportError::FuncCode),
    }
}

/// Parse a PDU from `buf`'s current window, dispatching on its first byte.
pub fn parse<const N: usize, U>(
    result: &mut ModbusResult,
    access: &AccessControl<U>,
    arg: &mut Argument,
    buf: &Buffer<N>,
    is_request: bool,
) -> Result<u16, TransportError> {
    if buf.this_size() < 1 {
        return Err(TransportError::TooShort);
    }
    let func_code = buf.get_u8(0);
    arg.set_function_code(func_code);

    match func_code {
        FUNC_READ_COIL => {
            if is_request {
                coil::parse_request_read(result, access, arg, buf)
            } else {
                coil::parse_response_read(arg, buf)
            }
        }
        FUNC_WRITE_COIL => {
            if is_request {
                coil::parse_request_write(result, access, arg, buf)
            } else {
                coil::parse_response_write(arg, buf)
            }
        }
        FUNC_WRITE_COILS => {
            if is_request {
                coil::parse_request_write_multiple(result, access, arg, buf)
            } else {
                coil::parse_response_write_multiple(arg, buf)
            }
        }
        FUNC_READ_DISCRETE => {
            if is_request {
                discrete::parse_request(result, access, arg, buf)
            } else {
                discrete::parse_response(arg, buf)
            }
        }
        FUNC_READ_HOLD => {
            if is_request {
                hold::parse_request_read(result, access, arg, buf)
            } else {
                hold::parse_response_read(arg, buf)
            }
        }
        FUNC_WRITE_HOLD => {
            if is_request {
                hold::parse_request_write(result, access, arg, buf)
            } else {
                hold::parse_response_write(arg, buf)
            }
        }
        FUNC_WRITE_HOLDS => {
            if is_request {
                hold::parse_request_write_multiple(result, access, arg, buf)
            } else {
                hold::parse_response_write_multiple(arg, buf)
            }
        }
        FUNC_READ_INPUT => {
            if is_request {
                input::parse_request(result, access, arg, buf)
            } else {
                input::parse_response(arg, buf)
            }
        }
        code if code & 0x80 != 0 && SUPPORTED_FUNC_CODES.contains(&(code & !0x80)) => {
            if is_request {
                Err(TransportError::FuncCode)
            } else {
                excep::parse_response(result, buf)
            }
        }
        _ => Err(TransportError::FuncCode),
    }
}
