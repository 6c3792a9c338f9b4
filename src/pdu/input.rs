//! Read Input Registers (0x04).

use crate::Endian;
use crate::access::AccessControl;
use crate::argument::Argument;
use crate::buffer::Buffer;
use crate::error::{ModbusException, TransportError};
use crate::result::ModbusResult;

const QTY_MIN: u16 = 0x0001;
const QTY_MAX: u16 = 0x007D;

/// <---- Read Input Registers Request PDU ---->
/// | Function Code | Starting Address | Quantity |
/// | 1 Byte         | 2 Bytes          | 2 Bytes  |
pub fn pack_request<const N: usize>(arg: &Argument, buf: &mut Buffer<N>) -> Result<u16, TransportError> {
    let qty = arg.quantity();
    if !(QTY_MIN..=QTY_MAX).contains(&qty) {
        return Err(TransportError::RegLen);
    }
    buf.put_u8(crate::pdu::FUNC_READ_INPUT)?;
    buf.put_u16(arg.register_address(), Endian::Big)?;
    buf.put_u16(qty, Endian::Big)?;
    Ok(5)
}

pub fn parse_request<const N: usize, U>(
    result: &mut ModbusResult,
    access: &AccessControl<U>,
    arg: &mut Argument,
    buf: &Buffer<N>,
) -> Result<u16, TransportError> {
    if buf.this_size() < 5 {
        return Err(TransportError::TooShort);
    }
    let addr = buf.get_u16(1, Endian::Big);
    let qty = buf.get_u16(3, Endian::Big);

    if !(QTY_MIN..=QTY_MAX).contains(&qty) {
        result.set_excep_code(ModbusException::IllegalDataValue.code());
    } else {
        match access.check_input(addr, qty, true) {
            None => result.set_excep_code(ModbusException::IllegalFunction.code()),
            Some(false) => result.set_excep_code(ModbusException::IllegalDataAddress.code()),
            Some(true) => {
                arg.set_register_address(addr);
                arg.set_quantity(qty);
            }
        }
    }
    Ok(5)
}

/// <---- Read Input Registers Response PDU ---->
/// | Function Code | Byte Count | Register Values |
/// | 1 Byte         | 1 Byte     | n Bytes          |
pub fn pack_response<const N: usize>(arg: &Argument, buf: &mut Buffer<N>) -> Result<u16, TransportError> {
    let qty = arg.quantity();
    if !(QTY_MIN..=QTY_MAX).contains(&qty) {
        return Err(TransportError::RegLen);
    }
    let count = qty * 2;
    buf.put_u8(crate::pdu::FUNC_READ_INPUT)?;
    buf.put_u8(count as u8)?;
    buf.put_bytes(&arg.payload()[..count as usize])?;
    Ok(2 + count)
}

pub fn parse_response<const N: usize>(arg: &mut Argument, buf: &Buffer<N>) -> Result<u16, TransportError> {
    if buf.this_size() < 2 {
        return Err(TransportError::TooShort);
    }
    let count = buf.get_u8(1) as u16;
    if buf.this_size() < 2 + count {
        return Err(TransportError::TooShort);
    }
    if count != arg.quantity() * 2 {
        return Err(TransportError::Length);
    }
    arg.set_payload(buf.get_bytes(2, 2 + count));
    Ok(2 + count)
}
