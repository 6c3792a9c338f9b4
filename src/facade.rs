//! Top-level entry point tying header, argument, access control, and result
//! together around one working buffer (§4.6, the reference implementation's
//! `Modbus` struct).

use crate::access::AccessControl;
use crate::adu::{ascii, rtu, tcp};
use crate::argument::Argument;
use crate::buffer::Buffer;
use crate::error::TransportError;
use crate::header::{Header, Protocol};
use crate::result::ModbusResult;
use crate::MAX_ADU;

/// Owns one request/response's worth of state plus a reusable [`MAX_ADU`]-byte
/// working buffer. `U` is the opaque user-data type threaded through
/// [`AccessControl`]; pass `()` when no address-space predicates are needed.
pub struct Facade<U> {
    header: Header,
    argument: Argument,
    access: AccessControl<U>,
    result: ModbusResult,
    buf: Buffer<MAX_ADU>,
}

impl<U> Default for Facade<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> Facade<U> {
    pub fn new() -> Self {
        Self {
            header: Header::new(),
            argument: Argument::new(),
            access: AccessControl::new(),
            result: ModbusResult::new(),
            buf: Buffer::new(),
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    pub fn argument(&self) -> &Argument {
        &self.argument
    }

    pub fn argument_mut(&mut self) -> &mut Argument {
        &mut self.argument
    }

    pub fn access(&self) -> &AccessControl<U> {
        &self.access
    }

    pub fn access_mut(&mut self) -> &mut AccessControl<U> {
        &mut self.access
    }

    pub fn result(&self) -> &ModbusResult {
        &self.result
    }

    pub fn result_mut(&mut self) -> &mut ModbusResult {
        &mut self.result
    }

    /// Encode the current header/argument as a request ADU into `out`.
    pub fn pack_request(&mut self, out: &mut [u8]) -> Result<u16, TransportError> {
        self.pack(out, true)
    }

    /// Encode the current header/argument/result as a response ADU into `out`.
    ///
    /// A non-normal [`ModbusResult::excep_code`] produces an exception PDU
    /// regardless of the argument's function code.
    pub fn pack_response(&mut self, out: &mut [u8]) -> Result<u16, TransportError> {
        self.pack(out, false)
    }

    fn pack(&mut self, out: &mut [u8], is_request: bool) -> Result<u16, TransportError> {
        self.buf.init(MAX_ADU as u16);
        let packed = match self.header.protocol() {
            Protocol::Rtu => rtu::pack(&self.header, &mut self.result, &self.argument, &mut self.buf, is_request),
            Protocol::Ascii => ascii::pack(&self.header, &mut self.result, &self.argument, &mut self.buf, is_request),
            Protocol::Tcp => tcp::pack(&self.header, &mut self.result, &self.argument, &mut self.buf, is_request),
        };
        let len = match packed {
            Ok(len) => len,
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("modbus pack failed: {}", e);
                return Err(e);
            }
        };
        let src = self.buf.as_slice();
        if out.len() < src.len() {
            #[cfg(feature = "defmt")]
            defmt::warn!("modbus pack failed: {}", TransportError::BufTooShort);
            return Err(TransportError::BufTooShort);
        }
        out[..src.len()].copy_from_slice(src);
        #[cfg(feature = "defmt")]
        defmt::trace!("modbus pack ok: func={} len={}", self.argument.function_code(), len);
        Ok(len)
    }

    /// Decode a request ADU, filling the header/argument and setting the result.
    pub fn parse_request(&mut self, data: &[u8]) -> Result<u16, TransportError> {
        self.parse(data, true)
    }

    /// Decode a response ADU against the header/argument already set by a prior
    /// `pack_request` (device id and, for TCP, the transaction id are verified
    /// against what was sent).
    pub fn parse_response(&mut self, data: &[u8]) -> Result<u16, TransportError> {
        self.parse(data, false)
    }

    fn parse(&mut self, data: &[u8], is_request: bool) -> Result<u16, TransportError> {
        self.result.reset();
        let mut buf = match Buffer::<MAX_ADU>::from_slice(data) {
            Ok(buf) => buf,
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("modbus parse failed: {}", e);
                return Err(e);
            }
        };
        let parsed = match self.header.protocol() {
            Protocol::Rtu => rtu::parse(
                &mut self.header,
                &self.access,
                &mut self.result,
                &mut self.argument,
                &mut buf,
                is_request,
            ),
            Protocol::Ascii => ascii::parse(
                &mut self.header,
                &self.access,
                &mut self.result,
                &mut self.argument,
                &buf,
                is_request,
            ),
            Protocol::Tcp => tcp::parse(
                &mut self.header,
                &self.access,
                &mut self.result,
                &mut self.argument,
                &mut buf,
                is_request,
            ),
        };
        match parsed {
            Ok(len) => {
                if self.result.is_normal() {
                    #[cfg(feature = "defmt")]
                    defmt::trace!("modbus parse ok: func={} len={}", self.argument.function_code(), len);
                } else {
                    #[cfg(feature = "defmt")]
                    defmt::debug!(
                        "modbus parse exception: func={} excep={}",
                        self.argument.function_code(),
                        self.result.excep_code()
                    );
                }
                Ok(len)
            }
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("modbus parse failed: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_coils_request_round_trip() {
        let mut master: Facade<()> = Facade::new();
        master.header_mut().set_rtu(0x01);
        master.argument_mut().set_function_code(0x01);
        master.argument_mut().set_register_address(0x0000);
        master.argument_mut().set_quantity(0x0007);

        let mut frame = [0u8; 64];
        let len = master.pack_request(&mut frame).unwrap();
        assert_eq!(&frame[..len as usize], &[0x01, 0x01, 0x00, 0x00, 0x00, 0x07, 0x7D, 0xC8]);

        let mut slave: Facade<()> = Facade::new();
        slave.access_mut().set_user_data(());
        slave.access_mut().set_check_coil(|_addr, _qty, _is_read, _u| true);
        slave.header_mut().set_rtu(0);
        let parsed_len = slave.parse_request(&frame[..len as usize]).unwrap();
        assert_eq!(parsed_len, len);
        assert_eq!(slave.header().devid(), 0x01);
        assert_eq!(slave.argument().register_address(), 0x0000);
        assert_eq!(slave.argument().quantity(), 0x0007);
        assert!(slave.result().is_normal());
    }

    #[test]
    fn response_exception_round_trip() {
        let mut slave: Facade<()> = Facade::new();
        slave.header_mut().set_rtu(0x01);
        slave.argument_mut().set_function_code(0x01);

        slave.result_mut().set_excep_code(crate::error::ModbusException::IllegalDataAddress.code());

        let mut frame = [0u8; 64];
        let len = slave.pack_response(&mut frame).unwrap();
        assert_eq!(len, 5); // devid(1) + exception PDU(2) + CRC16(2)
        assert_eq!(frame[0], 0x01);
        assert_eq!(&frame[1..3], &[0x81, 0x02]);

        let mut master: Facade<()> = Facade::new();
        master.header_mut().set_rtu(0x01);
        master.argument_mut().set_function_code(0x01);
        master.parse_response(&frame[..len as usize]).unwrap();
        assert_eq!(
            master.result().exception(),
            crate::error::ModbusException::IllegalDataAddress
        );
    }
}
