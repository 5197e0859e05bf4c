pub(crate) fn to_u16(a: u8, b: u8) -> u16 {
    ((a as u16) << 8) + (b as u16)
}

pub fn degree_to_radian(degree: f64) -> f64 {
    degree * std::f64::consts::PI / 180.
}

/// Angle of a measurement node in degree. The angle is stored in q6 fixed
/// point, shifted left by one to make room for the check bit.
pub(crate) fn to_angle(bit1: u8, bit2: u8) -> f64 {
    let a = ((bit1 as u16) >> 1) + ((bit2 as u16) << 7);
    (a as f64) / 64.
}

/// Distance of a measurement node in mm, stored in q2 fixed point.
pub(crate) fn calc_distance(b1: u8, b2: u8) -> f64 {
    (to_u16(b2, b1) as f64) / 4.
}

pub(crate) fn to_string(data: &[u8]) -> String {
    data.iter()
        .map(|e| format!("{:02X}", e))
        .collect::<Vec<_>>()
        .join(" ")
}
