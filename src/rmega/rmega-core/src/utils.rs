use crate::instructions::Size;

// Replaces the low `size` bits of `target` with `value`, keeping the rest
pub fn merge_sized(target: u32, value: u32, size: Size) -> u32 {
    (target & !size.mask()) | (value & size.mask())
}

// Tests the sign bit of `value` at operand width `size`
pub fn is_negative(value: u32, size: Size) -> bool {
    value & size.sign_bit() != 0
}

// Adds a signed 16-bit displacement to a 32-bit address
pub fn displace(base: u32, displacement: i16) -> u32 {
    base.wrapping_add(displacement as i32 as u32)
}

// Big-endian load of `size` bytes from the start of `bytes`
pub fn read_be(bytes: &[u8], size: Size) -> u32 {
    bytes[..size.bytes() as usize]
        .iter()
        .fold(0u32, |acc, b| (acc << 8) | u32::from(*b))
}

// Big-endian store of the low `size` bytes of `value`
pub fn write_be(bytes: &mut [u8], size: Size, value: u32) {
    let len = size.bytes() as usize;
    for (i, byte) in bytes[..len].iter_mut().enumerate() {
        *byte = (value >> (8 * (len - 1 - i))) as u8;
    }
}
