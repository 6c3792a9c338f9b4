//! Exception response PDU (response direction only, any function code).

use crate::argument::Argument;
use crate::buffer::Buffer;
use crate::error::TransportError;
use crate::result::ModbusResult;

/// <---- Exception PDU ---->
/// | Function Code | 0x80 | Exception Code |
/// | 1 Byte                | 1 Byte         |
pub fn pack_response<const N: usize>(
    result: &ModbusResult,
    arg: &Argument,
    buf: &mut Buffer<N>,
) -> Result<u16, TransportError> {
    buf.put_u8(arg.function_code() | 0x80)?;
    buf.put_u8(result.excep_code())?;
    Ok(2)
}

pub fn parse_response<const N: usize>(result: &mut ModbusResult, buf: &Buffer<N>) -> Result<u16, TransportError> {
    if buf.this_size() < 2 {
        return Err(TransportError::TooShort);
    }
    result.set_excep_code(buf.get_u8(1));
    Ok(2)
}
