//! Function code, address, quantity, and payload views (§3, Argument).

use heapless::Vec;

use crate::Endian;
use crate::MAX_PAYLOAD;
use crate::convert;

/// Request/response parameters shared by every function code.
///
/// The raw payload is authoritative; [`Argument::bits`]/[`Argument::registers`]
/// convert on access rather than being kept in sync as separate fields.
#[derive(Clone, Debug, Default)]
pub struct Argument {
    function_code: u8,
    register_address: u16,
    quantity: u16,
    payload: Vec<u8, MAX_PAYLOAD>,
}

impl Argument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed function code, address, and quantity at once (used before a read pack).
    pub fn init(&mut self, function_code: u8, register_address: u16, quantity: u16) {
        self.function_code = function_code;
        self.register_address = register_address;
        self.quantity = quantity;
        self.payload.clear();
    }

    pub fn reset(&mut self) {
        self.payload.clear();
    }

    pub fn set_function_code(&mut self, v: u8) -> &mut Self {
        self.function_code = v;
        self
    }

    pub fn set_register_address(&mut self, v: u16) -> &mut Self {
        self.register_address = v;
        self
    }

    pub fn set_quantity(&mut self, v: u16) -> &mut Self {
        self.quantity = v;
        self
    }

    pub const fn function_code(&self) -> u8 {
        self.function_code
    }

    pub const fn register_address(&self) -> u16 {
        self.register_address
    }

    pub const fn quantity(&self) -> u16 {
        self.quantity
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Overwrite the raw payload with `data` (truncated to [`MAX_PAYLOAD`]).
    pub fn set_payload(&mut self, data: &[u8]) {
        self.payload.clear();
        let _ = self.payload.extend_from_slice(data);
    }

    /// Register view: decode the payload as big-endian 16-bit words.
    pub fn registers(&self) -> Vec<u16, { MAX_PAYLOAD / 2 }> {
        convert::bytes_to_u16s(&self.payload, Endian::Big)
    }

    /// Set the payload from big-endian 16-bit words.
    pub fn set_registers(&mut self, words: &[u16]) {
        self.payload = convert::bytes_from_u16s(words, Endian::Big);
    }

    /// Bit view: decode `qty` booleans from the packed payload, LSB-first within each byte.
    pub fn bits(&self, qty: u16) -> Vec<bool, { MAX_PAYLOAD * 8 }> {
        convert::unpack_bits(&self.payload, qty as usize)
    }

    /// Set the payload from a boolean sequence, packed LSB-first within each byte.
    pub fn set_bits(&mut self, bits: &[bool]) {
        self.payload = convert::pack_bits(bits);
    }
}
