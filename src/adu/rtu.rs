//! RTU framing: `devid(1) | PDU(n) | CRC16-LE(2)` (§4.5).

use crate::Endian;
use crate::access::AccessControl;
use crate::buffer::Buffer;
use crate::checksum;
use crate::error::TransportError;
use crate::header::Header;
use crate::result::ModbusResult;
use crate::{Argument, pdu};

const MAX_LEN: u16 = 256;
const MIN_LEN: u16 = 4;

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
    buf.set_max(MAX_LEN);
    buf.put_u8(header.devid())?;
    buf.add_last(1);

    let pdu_len = pdu::pack(result, arg, buf, is_request)?;

    let crc = checksum::crc16(buf.get_range(0, pdu_len + 1));
    buf.put_u16(crc, Endian::Little)?;

    let ret_len = pdu_len + 3;
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

    let devid = buf.get_u8(0);
    if is_request {
        if !access.accepts_devid(devid) {
            return Err(TransportError::DevId);
        }
    } else if header.devid() != devid {
        return Err(TransportError::DevId);
    }
    header.set_devid(devid);

    buf.add_last(1);
    let pdu_len = pdu::parse(result, access, arg, buf, is_request)?;

    let crc1 = checksum::crc16(buf.get_range(0, pdu_len + 1));
    let crc2 = buf.get_u16(pdu_len, Endian::Little);
    if crc1 != crc2 {
        return Err(TransportError::RtuCrc);
    }

    let ret_len = pdu_len + 3;
    if buf.size() != ret_len {
        return Err(TransportError::TrailingBytes);
    }

    result.set_ret_len(ret_len);
    Ok(ret_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(_addr: u16, _qty: u16, _is_read: bool, _u: &()) -> bool {
        true
    }

    #[test]
    fn read_coils_request_matches_spec_vector() {
        let mut header = Header::new();
        header.set_rtu(0x01);
        let mut result = ModbusResult::new();
        let mut arg = Argument::new();
        arg.set_function_code(pdu::FUNC_READ_COIL);
        arg.set_register_address(0x0000);
        arg.set_quantity(0x0007);

        let mut buf: Buffer<64> = Buffer::new();
        buf.init(64);
        let len = pack(&header, &mut result, &arg, &mut buf, true).unwrap();
        assert_eq!(len, 8);
        assert_eq!(buf.as_slice(), &[0x01, 0x01, 0x00, 0x00, 0x00, 0x07, 0x7D, 0xC8]);
    }

    #[test]
    fn read_coils_response_matches_spec_vector() {
        let mut header = Header::new();
        header.set_rtu(0x01);
        let mut result = ModbusResult::new();
        let mut arg = Argument::new();
        arg.set_function_code(pdu::FUNC_READ_COIL);
        arg.set_quantity(7);
        arg.set_bits(&[true, false, true, true, false, false, true]);

        let mut buf: Buffer<64> = Buffer::new();
        buf.init(64);
        let len = pack(&header, &mut result, &arg, &mut buf, false).unwrap();
        assert_eq!(len, 6);
        assert_eq!(buf.as_slice(), &[0x01, 0x01, 0x01, 0x4D, 0x91, 0xBD]);
    }

    #[test]
    fn write_multiple_holdings_matches_spec_vector() {
        let mut header = Header::new();
        header.set_rtu(0x59);
        let mut result = ModbusResult::new();
        let mut arg = Argument::new();
        arg.set_function_code(pdu::FUNC_WRITE_HOLDS);
        arg.set_register_address(0x0043);
        arg.set_quantity(0x000D);
        arg.set_registers(&[10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22]);

        let mut buf: Buffer<64> = Buffer::new();
        buf.init(64);
        let len = pack(&header, &mut result, &arg, &mut buf, true).unwrap();
        assert_eq!(len, 34);
        assert_eq!(
            buf.as_slice(),
            &[
                0x59, 0x10, 0x00, 0x43, 0x00, 0x0D, 0x1A, 0x00, 0x0A, 0x00, 0x0B, 0x00, 0x0C, 0x00, 0x0D, 0x00, 0x0E,
                0x00, 0x0F, 0x00, 0x10, 0x00, 0x11, 0x00, 0x12, 0x00, 0x13, 0x00, 0x14, 0x00, 0x15, 0x00, 0x16, 0xC1,
                0x6A,
            ]
        );
    }

    #[test]
    fn round_trip_read_coils_request() {
        let mut pack_header = Header::new();
        pack_header.set_rtu(0x01);
        let mut result = ModbusResult::new();
        let mut arg = Argument::new();
        arg.set_function_code(pdu::FUNC_READ_COIL);
        arg.set_register_address(0x0131);
        arg.set_quantity(2);
        let mut buf: Buffer<64> = Buffer::new();
        buf.init(64);
        pack(&pack_header, &mut result, &arg, &mut buf, true).unwrap();
        assert_eq!(buf.as_slice(), &[0x01, 0x01, 0x01, 0x31, 0x00, 0x02, 0xED, 0xF8]);

        let mut parse_header = Header::new();
        parse_header.set_rtu(0);
        let mut access: AccessControl<()> = AccessControl::new();
        access.set_user_data(());
        access.set_check_coil(always);
        let mut parsed_result = ModbusResult::new();
        let mut parsed_arg = Argument::new();
        let mut parse_buf: Buffer<64> = Buffer::from_slice(buf.as_slice()).unwrap();
        let len = parse(&mut parse_header, &access, &mut parsed_result, &mut parsed_arg, &mut parse_buf, true)
            .unwrap();
        assert_eq!(len, 8);
        assert_eq!(parse_header.devid(), 0x01);
        assert_eq!(parsed_arg.register_address(), 0x0131);
        assert_eq!(parsed_arg.quantity(), 2);
    }

    #[test]
    fn read_coils_spanning_two_payload_bytes_matches_fixture() {
        // addr=0x0101, qty=9: bit sequence 0,1,0,1,0,1,1,1,0 (original_source/modbus_test.go:99-112).
        let mut pack_header = Header::new();
        pack_header.set_rtu(0x01);
        let mut result = ModbusResult::new();
        let mut arg = Argument::new();
        arg.set_function_code(pdu::FUNC_READ_COIL);
        arg.set_register_address(0x0101);
        arg.set_quantity(9);
        let mut buf: Buffer<64> = Buffer::new();
        buf.init(64);
        pack(&pack_header, &mut result, &arg, &mut buf, true).unwrap();
        assert_eq!(buf.as_slice(), &[0x01, 0x01, 0x01, 0x01, 0x00, 0x09, 0xAC, 0x30]);

        let mut parse_header = Header::new();
        parse_header.set_rtu(0);
        let mut access: AccessControl<()> = AccessControl::new();
        access.set_user_data(());
        access.set_check_coil(always);
        let mut parsed_result = ModbusResult::new();
        let mut parsed_arg = Argument::new();
        let mut parse_buf: Buffer<64> = Buffer::from_slice(buf.as_slice()).unwrap();
        let len = parse(&mut parse_header, &access, &mut parsed_result, &mut parsed_arg, &mut parse_buf, true)
            .unwrap();
        assert_eq!(len, 8);
        assert_eq!(parsed_arg.register_address(), 0x0101);
        assert_eq!(parsed_arg.quantity(), 9);

        let mut resp_header = Header::new();
        resp_header.set_rtu(0x01);
        let mut resp_result = ModbusResult::new();
        let mut resp_arg = Argument::new();
        resp_arg.set_function_code(pdu::FUNC_READ_COIL);
        resp_arg.set_quantity(9);
        resp_arg.set_bits(&[false, true, false, true, false, true, true, true, false]);
        let mut resp_buf: Buffer<64> = Buffer::new();
        resp_buf.init(64);
        pack(&resp_header, &mut resp_result, &resp_arg, &mut resp_buf, false).unwrap();
        assert_eq!(resp_buf.as_slice(), &[0x01, 0x01, 0x02, 0xEA, 0x00, 0xF6, 0x9C]);
    }

    #[test]
    fn bad_crc_is_rejected() {
        let mut header = Header::new();
        header.set_rtu(0x01);
        let access: AccessControl<()> = AccessControl::new();
        let mut result = ModbusResult::new();
        let mut arg = Argument::new();
        let mut buf: Buffer<64> = Buffer::from_slice(&[0x01, 0x01, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00]).unwrap();
        assert_eq!(
            parse(&mut header, &access, &mut result, &mut arg, &mut buf, true),
            Err(TransportError::RtuCrc)
        );
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut header = Header::new();
        header.set_rtu(0x01);
        let access: AccessControl<()> = AccessControl::new();
        let mut result = ModbusResult::new();
        let mut arg = Argument::new();
        let frame = [0x01u8, 0x01, 0x00, 0x00, 0x00, 0x07, 0x7D, 0xC8, 0x00];
        let mut buf: Buffer<64> = Buffer::from_slice(&frame).unwrap();
        assert_eq!(
            parse(&mut header, &access, &mut result, &mut arg, &mut buf, true),
            Err(TransportError::TrailingBytes)
        );
    }
}
