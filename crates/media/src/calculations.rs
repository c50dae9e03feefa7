//! Pure dimension math for gallery uploads.

/// Dimensions after shrinking to at most `max_width`, preserving aspect ratio.
///
/// Images already at or below `max_width` are returned unchanged. Heights
/// are rounded and never drop below one pixel.
///
/// ```
/// # use sitesync_media::fit_within_width;
/// assert_eq!(fit_within_width((2400, 1600), 1200), (1200, 800));
/// assert_eq!(fit_within_width((800, 600), 1200), (800, 600));
/// ```
pub fn fit_within_width(source: (u32, u32), max_width: u32) -> (u32, u32) {
    let (width, height) = source;
    if width <= max_width || width == 0 {
        return source;
    }
    let scaled = (height as f64 * max_width as f64 / width as f64).round() as u32;
    (max_width, scaled.max(1))
}
