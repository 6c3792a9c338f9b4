//! Read Coils (0x01), Write Single Coil (0x05), Write Multiple Coils (0x0F).

use crate::Endian;
use crate::access::AccessControl;
use crate::argument::Argument;
use crate::buffer::Buffer;
use crate::error::{ModbusException, TransportError};
use crate::result::ModbusResult;

const QTY_MIN: u16 = 0x0001;
const READ_QTY_MAX: u16 = 0x07D0;
const WRITE_MULTI_QTY_MAX: u16 = 0x07B0;

/// <---- Read Coils Request PDU ---->
/// | Function Code | Starting Address | Quantity |
/// | 1 Byte         | 2 Bytes          | 2 Bytes  |
pub fn pack_request_read<const N: usize>(arg: &Argument, buf: &mut Buffer<N>) -> Result<u16, TransportError> {
    let qty = arg.quantity();
    if !(QTY_MIN..=READ_QTY_MAX).contains(&qty) {
        return Err(TransportError::RegLen);
    }
    buf.put_u8(crate::pdu::FUNC_READ_COIL)?;
    buf.put_u16(arg.register_address(), Endian::Big)?;
    buf.put_u16(qty, Endian::Big)?;
    Ok(5)
}

pub fn parse_request_read<const N: usize, U>(
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

    if !(QTY_MIN..=READ_QTY_MAX).contains(&qty) {
        result.set_excep_code(ModbusException::IllegalDataValue.code());
    } else {
        match access.check_coil(addr, qty, true) {
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

/// <---- Read Coils Response PDU ---->
/// | Function Code | Byte Count | Coil Status |
/// | 1 Byte         | 1 Byte     | n Bytes     |
pub fn pack_response_read<const N: usize>(arg: &Argument, buf: &mut Buffer<N>) -> Result<u16, TransportError> {
    let qty = arg.quantity();
    if !(QTY_MIN..=READ_QTY_MAX).contains(&qty) {
        return Err(TransportError::RegLen);
    }
    let count = qty.div_ceil(8);
    buf.put_u8(crate::pdu::FUNC_READ_COIL)?;
    buf.put_u8(count as u8)?;
    buf.put_bytes(&arg.payload()[..count as usize])?;
    Ok(2 + count)
}

pub fn parse_response_read<const N: usize>(arg: &mut Argument, buf: &Buffer<N>) -> Result<u16, TransportError> {
    if buf.this_size() < 2 {
        return Err(TransportError::TooShort);
    }
    let count = buf.get_u8(1) as u16;
    if buf.this_size() < 2 + count {
        return Err(TransportError::TooShort);
    }
    if count != arg.quantity().div_ceil(8) {
        return Err(TransportError::Length);
    }
    arg.set_payload(buf.get_bytes(2, 2 + count));
    Ok(2 + count)
}

/// <---- Write Single Coil Request/Response PDU ---->
/// | Function Code | Output Address | Output Value |
/// | 1 Byte         | 2 Bytes        | 2 Bytes      |
fn pack_single<const N: usize>(code: u8, arg: &Argument, buf: &mut Buffer<N>) -> Result<u16, TransportError> {
    buf.put_u8(code)?;
    buf.put_u16(arg.register_address(), Endian::Big)?;
    let on = arg.payload().first().copied().unwrap_or(0) & 0x01 != 0;
    buf.put_u16(if on { 0xFF00 } else { 0x0000 }, Endian::Big)?;
    Ok(5)
}

pub fn pack_request_write<const N: usize>(arg: &Argument, buf: &mut Buffer<N>) -> Result<u16, TransportError> {
    pack_single(crate::pdu::FUNC_WRITE_COIL, arg, buf)
}

pub fn pack_response_write<const N: usize>(arg: &Argument, buf: &mut Buffer<N>) -> Result<u16, TransportError> {
    pack_single(crate::pdu::FUNC_WRITE_COIL, arg, buf)
}

pub fn parse_request_write<const N: usize, U>(
    result: &mut ModbusResult,
    access: &AccessControl<U>,
    arg: &mut Argument,
    buf: &Buffer<N>,
) -> Result<u16, TransportError> {
    if buf.this_size() < 5 {
        return Err(TransportError::TooShort);
    }
    let addr = buf.get_u16(1, Endian::Big);
    let value = buf.get_u16(3, Endian::Big);

    match access.check_coil(addr, 1, false) {
        None => result.set_excep_code(ModbusException::IllegalFunction.code()),
        Some(false) => result.set_excep_code(ModbusException::IllegalDataAddress.code()),
        Some(true) => match value {
            0x0000 => {
                arg.set_register_address(addr);
                arg.set_quantity(1);
                arg.set_payload(&[0x00]);
            }
            0xFF00 => {
                arg.set_register_address(addr);
                arg.set_quantity(1);
                arg.set_payload(&[0x01]);
            }
            _ => result.set_excep_code(ModbusException::IllegalDataValue.code()),
        },
    }
    Ok(5)
}

pub fn parse_response_write<const N: usize>(arg: &Argument, buf: &Buffer<N>) -> Result<u16, TransportError> {
    if buf.this_size() < 5 {
        return Err(TransportError::TooShort);
    }
    let addr = buf.get_u16(1, Endian::Big);
    if arg.register_address() != addr {
        return Err(TransportError::RegAddr);
    }
    let wire_on = buf.get_u16(3, Endian::Big) == 0xFF00;
    let arg_on = arg.payload().first().copied().unwrap_or(0) & 0x01 != 0;
    if wire_on != arg_on {
        return Err(TransportError::RegValue);
    }
    Ok(5)
}

/// <---- Write Multiple Coils Request PDU ---->
/// | Function Code | Starting Address | Quantity | Byte Count | Coil Status |
/// | 1 Byte         | 2 Bytes          | 2 Bytes  | 1 Byte     | n Bytes     |
pub fn pack_request_write_multiple<const N: usize>(
    arg: &Argument,
    buf: &mut Buffer<N>,
) -> Result<u16, TransportError> {
    let qty = arg.quantity();
    if !(QTY_MIN..=WRITE_MULTI_QTY_MAX).contains(&qty) {
        return Err(TransportError::RegLen);
    }
    let count = qty.div_ceil(8);
    buf.put_u8(crate::pdu::FUNC_WRITE_COILS)?;
    buf.put_u16(arg.register_address(), Endian::Big)?;
    buf.put_u16(qty, Endian::Big)?;
    buf.put_u8(count as u8)?;
    buf.put_bytes(&arg.payload()[..count as usize])?;
    Ok(6 + count)
}

pub fn parse_request_write_multiple<const N: usize, U>(
    result: &mut ModbusResult,
    access: &AccessControl<U>,
    arg: &mut Argument,
    buf: &Buffer<N>,
) -> Result<u16, TransportError> {
    if buf.this_size() < 6 {
        return Err(TransportError::TooShort);
    }
    let addr = buf.get_u16(1, Endian::Big);
    let qty = buf.get_u16(3, Endian::Big);
    let count = qty.div_ceil(8);
    if buf.this_size() < 6 + count {
        return Err(TransportError::Length);
    }
    let declared_count = buf.get_u8(5) as u16;

    if !(QTY_MIN..=WRITE_MULTI_QTY_MAX).contains(&qty) || declared_count != count {
        result.set_excep_code(ModbusException::IllegalDataValue.code());
    } else {
        match access.check_coil(addr, qty, false) {
            None => result.set_excep_code(ModbusException::IllegalFunction.code()),
            Some(false) => result.set_excep_code(ModbusException::IllegalDataAddress.code()),
            Some(true) => {
                arg.set_register_address(addr);
                arg.set_quantity(qty);
                arg.set_payload(buf.get_bytes(6, 6 + count));
            }
        }
    }
    Ok(6 + count)
}

/// <---- Write Multiple Coils Response PDU ---->
/// | Function Code | Starting Address | Quantity |
/// | 1 Byte         | 2 Bytes          | 2 Bytes  |
pub fn pack_response_write_multiple<const N: usize>(
    arg: &Argument,
    buf: &mut Buffer<N>,
) -> Result<u16, TransportError> {
    buf.put_u8(crate::pdu::FUNC_WRITE_COILS)?;
    buf.put_u16(arg.register_address(), Endian::Big)?;
    buf.put_u16(arg.quantity(), Endian::Big)?;
    Ok(5)
}

pub fn parse_response_write_multiple<const N: usize>(
    arg: &Argument,
    buf: &Buffer<N>,
) -> Result<u16, TransportError> {
    if buf.this_size() < 5 {
        return Err(TransportError::TooShort);
    }
    let addr = buf.get_u16(1, Endian::Big);
    if arg.register_address() != addr {
        return Err(TransportError::RegAddr);
    }
    let qty = buf.get_u16(3, Endian::Big);
    if arg.quantity() != qty {
        return Err(TransportError::RegLen);
    }
    Ok(5)
}
