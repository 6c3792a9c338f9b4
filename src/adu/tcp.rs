//! TCP/MBAP framing: `txid(2) | protocol_id(2)=0 | length(2) | devid(1) | PDU(n)` (§4.5).

use crate::Endian;
use crate::access::AccessControl;
use crate::buffer::Buffer;
use crate::error::TransportError;
use crate::header::Header;
use crate::result::ModbusResult;
use crate::{Argument, pdu};

const MBAP_LEN: u16 = 7;
const MIN_LEN: u16 = MBAP_LEN;

pub fn pack<const N: usize>(
    header: &Header,
    result: &mut ModbusResult,
    arg: &Argument,
    buf: &mut Buffer<N>,
    is_request: bool,
) -> Result<u16, TransportError> {
    if buf.max() < MIN_LEN {
        return Err(TransportError::BufTooShort);
    }

    buf.put_u16(header.sernum(), Endian::Big)?;
    buf.put_u16(0x0000, Endian::Big)?; // protocol id, always zero
    buf.put_u16(0x0000, Endian::Big)?; // length, patched below
    buf.put_u8(header.devid())?;
    buf.add_last(MBAP_LEN);

    let pdu_len = pdu::pack(result, arg, buf, is_request)?;
    buf.sub_last(MBAP_LEN);
    buf.set_u16(4, pdu_len + 1, Endian::Big);

    let ret_len = MBAP_LEN + pdu_len;
    result.set_ret_len(ret_len);
    Ok(ret_len)
}

pub fn parse<const N: usize, U>(
    header: &mut Header,
    access: &AccessControl<U>,
    result: &mut ModbusResult,
    arg: &mut Argument,
    buf: &mut Buffer<N>,
    is_request: bool,
) -> Result<u16, TransportError> {
    if buf.size() < MIN_LEN {
        return Err(TransportError::TooShort);
    }

    let sernum = buf.get_u16(0, Endian::Big);
    if is_request {
        header.set_sernum(sernum);
    } else if header.sernum() != sernum {
        return Err(TransportError::TcpSerNum);
    }

    let protocol_id = buf.get_u16(2, Endian::Big);
    if protocol_id != 0x0000 {
        return Err(TransportError::TcpProtocol);
    }

    let declared_len = buf.get_u16(4, Endian::Big);
    if buf.size() < MBAP_LEN - 1 + declared_len {
        return Err(TransportError::Length);
    }

    let devid = buf.get_u8(6);
    if is_request {
        if !access.accepts_devid(devid) {
            return Err(TransportError::DevId);
        }
    } else if header.devid() != devid {
        return Err(TransportError::DevId);
    }
    header.set_devid(devid);

    buf.add_last(MBAP_LEN);
    let pdu_len = pdu::parse(result, access, arg, buf, is_request)?;
    buf.sub_last(MBAP_LEN);

    if declared_len != pdu_len + 1 {
        return Err(TransportError::Length);
    }

    let ret_len = MBAP_LEN + pdu_len;
    result.set_ret_len(ret_len);
    Ok(ret_len)
}
