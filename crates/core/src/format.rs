//! Display helpers for job fields.

use crate::job::Dimensions;

/// `"W x H"`, or `"-"` when unknown.
pub fn format_dimensions(dims: Option<Dimensions>) -> String {
    match dims {
        Some(d) => format!("{} x {}", d.width, d.height),
        None => "-".to_string(),
    }
}

/// `m:ss`, or `"-"` when unknown or zero.
pub fn format_duration(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s > 0.0 => {
            let total = s.floor() as u64;
            format!("{}:{:02}", total / 60, total % 60)
        }
        _ => "-".to_string(),
    }
}

/// Milliseconds rendered as seconds with one decimal, or `"-"`.
pub fn format_processing_time(ms: Option<u64>) -> String {
    match ms {
        Some(ms) => format!("{:.1}s", ms as f64 / 1000.0),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions() {
        let dims = Dimensions { width: 1920, height: 1080 };
        assert_eq!(format_dimensions(Some(dims)), "1920 x 1080");
        assert_eq!(format_dimensions(None), "-");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(Some(75.9)), "1:15");
        assert_eq!(format_duration(Some(5.0)), "0:05");
        assert_eq!(format_duration(Some(0.0)), "-");
        assert_eq!(format_duration(None), "-");
    }

    #[test]
    fn processing_time() {
        assert_eq!(format_processing_time(Some(1530)), "1.5s");
        assert_eq!(format_processing_time(None), "-");
    }
}
