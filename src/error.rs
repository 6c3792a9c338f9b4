//! Transport-level error taxonomy, kept separate from Modbus exception codes (§7).
//!
//! A [`TransportError`] means the operation did not produce a usable ADU at
//! all (short frame, bad checksum, wrong framing byte). A [`ModbusException`]
//! means the operation completed normally but the request/response itself
//! carries a protocol-level rejection (illegal address, illegal value, ...).
//! The two channels never overlap: a parse that raises an exception still
//! returns `Ok(consumed_len)`.

use thiserror::Error;

/// Transport-level failure, mirroring the reference implementation's `ErrResult` table.
#[derive(Error, Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    #[error("message too short")]
    TooShort,
    #[error("protocol error")]
    Protocol,
    #[error("function code error")]
    FuncCode,
    #[error("device identifier error")]
    DevId,
    #[error("register address error")]
    RegAddr,
    #[error("register quantity error")]
    RegLen,
    #[error("register value error")]
    RegValue,
    #[error("message length error")]
    Length,
    #[error("CRC check error (Modbus RTU)")]
    RtuCrc,
    #[error("start character error (Modbus Ascii)")]
    AsciiStart,
    #[error("end character error (Modbus Ascii)")]
    AsciiEnd,
    #[error("LRC check error (Modbus Ascii)")]
    AsciiLrc,
    #[error("malformed hex digit (Modbus Ascii)")]
    AsciiHex,
    #[error("trailing bytes past end of frame (Modbus RTU)")]
    TrailingBytes,
    #[error("transaction id error (Modbus TCP)")]
    TcpSerNum,
    #[error("protocol identifier error (Modbus TCP)")]
    TcpProtocol,
    #[error("buffer too short")]
    BufTooShort,
}

impl TransportError {
    /// Stable numeric code, mirroring the source's `ErrResult.Code` enumeration.
    pub const fn code(self) -> u8 {
        match self {
            TransportError::TooShort => 1,
            TransportError::Protocol => 2,
            TransportError::FuncCode => 3,
            TransportError::DevId => 4,
            TransportError::RegAddr => 5,
            TransportError::RegLen => 6,
            TransportError::RegValue => 7,
            TransportError::Length => 8,
            TransportError::RtuCrc => 9,
            TransportError::AsciiStart => 10,
            TransportError::AsciiEnd => 11,
            TransportError::AsciiLrc => 12,
            TransportError::AsciiHex => 13,
            TransportError::TrailingBytes => 14,
            TransportError::TcpSerNum => 15,
            TransportError::TcpProtocol => 16,
            TransportError::BufTooShort => 17,
        }
    }
}

/// Modbus exception code carried in an exception response PDU (§7).
///
/// `Normal` (0x00) means "no exception"; every other variant is a value the
/// device/master can set on the result, though only a handful are ever
/// *inferred* by this crate's parsers (see each variant's doc).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ModbusException {
    Normal = 0x00,
    /// Inferred when a request names an address space with no access predicate installed.
    IllegalFunction = 0x01,
    /// Inferred when the installed predicate rejects the address/quantity.
    IllegalDataAddress = 0x02,
    /// Inferred when the quantity is out of range or a declared value/byte-count is inconsistent.
    IllegalDataValue = 0x03,
    SlaveDeviceFailure = 0x04,
    Acknowledge = 0x05,
    SlaveDeviceBusy = 0x06,
    NegativeAcknowledge = 0x07,
    MemoryParityError = 0x08,
    GatewayPathUnavailable = 0x0A,
    GatewayTargetDeviceFailedToRespond = 0x0B,
}

impl ModbusException {
    /// Map a raw wire byte to the exception enum, falling back to `Normal` for 0x00
    /// and a best-effort `SlaveDeviceFailure` for any value this crate doesn't name
    /// (callers that need the exact unrecognized byte should read it before conversion).
    pub const fn from_code(code: u8) -> Self {
        match code {
            0x00 => ModbusException::Normal,
            0x01 => ModbusException::IllegalFunction,
            0x02 => ModbusException::IllegalDataAddress,
            0x03 => ModbusException::IllegalDataValue,
            0x04 => ModbusException::SlaveDeviceFailure,
            0x05 => ModbusException::Acknowledge,
            0x06 => ModbusException::SlaveDeviceBusy,
            0x07 => ModbusException::NegativeAcknowledge,
            0x08 => ModbusException::MemoryParityError,
            0x0A => ModbusException::GatewayPathUnavailable,
            0x0B => ModbusException::GatewayTargetDeviceFailedToRespond,
            _ => ModbusException::SlaveDeviceFailure,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn is_normal(self) -> bool {
        matches!(self, ModbusException::Normal)
    }
}
