//! Table-driven fixed-point trigonometry on an 8-bit angle domain.
//!
//! One full turn is 256 angle units. Table entries are Q8.8 (256 == 1.0), so
//! `sin(angle, amplitude)` yields an integer in `[-amplitude, amplitude]`.
//! Angles wrap modulo 256; callers may pass any `i32`.

/// Number of angle units in one full cycle.
pub const ANGLE_STEPS: i32 = 256;

/// Quarter turn, used to derive cosine from the sine table.
pub const QUARTER_TURN: i32 = ANGLE_STEPS / 4;

/// Q8.8 sine over one cycle, truncated toward zero.
#[rustfmt::skip]
pub const SINE_TABLE: [i16; 256] = [
    0, 6, 12, 18, 25, 31, 37, 43, 49, 56, 62, 68, 74, 80, 86, 92,
    97, 103, 109, 115, 120, 126, 131, 136, 142, 147, 152, 157, 162, 167, 171, 176,
    181, 185, 189, 193, 197, 201, 205, 209, 212, 216, 219, 222, 225, 228, 231, 234,
    236, 238, 241, 243, 244, 246, 248, 249, 251, 252, 253, 254, 254, 255, 255, 255,
    256, 255, 255, 255, 254, 254, 253, 252, 251, 249, 248, 246, 244, 243, 241, 238,
    236, 234, 231, 228, 225, 222, 219, 216, 212, 209, 205, 201, 197, 193, 189, 185,
    181, 176, 171, 167, 162, 157, 152, 147, 142, 136, 131, 126, 120, 115, 109, 103,
    97, 92, 86, 80, 74, 68, 62, 56, 49, 43, 37, 31, 25, 18, 12, 6,
    0, -6, -12, -18, -25, -31, -37, -43, -49, -56, -62, -68, -74, -80, -86, -92,
    -97, -103, -109, -115, -120, -126, -131, -136, -142, -147, -152, -157, -162, -167, -171, -176,
    -181, -185, -189, -193, -197, -201, -205, -209, -212, -216, -219, -222, -225, -228, -231, -234,
    -236, -238, -241, -243, -244, -246, -248, -249, -251, -252, -253, -254, -254, -255, -255, -255,
    -256, -255, -255, -255, -254, -254, -253, -252, -251, -249, -248, -246, -244, -243, -241, -238,
    -236, -234, -231, -228, -225, -222, -219, -216, -212, -209, -205, -201, -197, -193, -189, -185,
    -181, -176, -171, -167, -162, -157, -152, -147, -142, -136, -131, -126, -120, -115, -109, -103,
    -97, -92, -86, -80, -74, -68, -62, -56, -49, -43, -37, -31, -25, -18, -12, -6,
];

/// Raw Q8.8 table lookup with wrap-around.
#[inline]
pub fn sine_q8(angle: i32) -> i32 {
    SINE_TABLE[(angle & 0xFF) as usize] as i32
}

/// `sin(angle) * amplitude`, scaled back to integer units by an arithmetic shift.
#[inline]
pub fn sin(angle: i32, amplitude: i32) -> i32 {
    (sine_q8(angle) * amplitude) >> 8
}

/// `cos(angle) * amplitude`; the cosine is the sine a quarter turn ahead.
#[inline]
pub fn cos(angle: i32, amplitude: i32) -> i32 {
    sin(angle + QUARTER_TURN, amplitude)
}
