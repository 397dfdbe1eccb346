/// mean returns the arithmetic mean, or None for an empty slice.
pub fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None
    }
    Some(values.iter().sum::<f32>() / values.len() as f32)
}

/// round_to rounds to the given number of decimal places.
pub fn round_to(value: f32, decimals: u32) -> f32 {
    let factor = 10f32.powi(decimals as i32);
    (value * factor).round() / factor
}
