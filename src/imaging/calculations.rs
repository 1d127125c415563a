//! Pure calculation functions for image geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Which axis binds a proportional ("max dimension") resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Width is the dominant axis (landscape or square sources).
    WidthLimited,
    /// Height is the dominant axis (portrait sources).
    HeightLimited,
}

impl Constraint {
    pub fn is_height_limited(self) -> bool {
        self == Constraint::HeightLimited
    }
}

/// Classify a source: height-limited when height exceeds width, else width-limited.
///
/// ```
/// # use gallery_variants::imaging::{classify, Constraint};
/// assert_eq!(classify(4000, 2000), Constraint::WidthLimited);
/// assert_eq!(classify(2000, 4000), Constraint::HeightLimited);
/// assert_eq!(classify(500, 500), Constraint::WidthLimited);
/// ```
pub fn classify(width: u32, height: u32) -> Constraint {
    if height > width {
        Constraint::HeightLimited
    } else {
        Constraint::WidthLimited
    }
}

/// Calculate output dimensions for a proportional resize bounded on one axis.
///
/// The axis selected by `constraint` becomes `max`; the other axis is scaled by
/// the same ratio and rounded. Without `enlarge`, a bound at or above the
/// source size leaves the source dimensions unchanged.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `constraint` - Which axis the bound applies to
/// * `max` - Target size of the bound axis
/// * `enlarge` - Whether upscaling past the source is allowed
///
/// # Returns
/// * `(width, height)` - Output dimensions, never zero on either axis
pub fn calculate_fit_dimensions(
    source: (u32, u32),
    constraint: Constraint,
    max: u32,
    enlarge: bool,
) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 || max == 0 {
        return source;
    }

    let bound = match constraint {
        Constraint::WidthLimited => src_w,
        Constraint::HeightLimited => src_h,
    };
    if max >= bound && !enlarge {
        return source;
    }

    let ratio = max as f64 / bound as f64;
    match constraint {
        Constraint::WidthLimited => (max, ((src_h as f64 * ratio).round() as u32).max(1)),
        Constraint::HeightLimited => (((src_w as f64 * ratio).round() as u32).max(1), max),
    }
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Fill dimensions (at least one matches target)
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height matches, width overflows
        let h = tgt_h;
        let w = ((h as f64 * src_aspect).round() as u32).max(tgt_w);
        (w, h)
    } else {
        // Source is taller: width matches, height overflows
        let w = tgt_w;
        let h = ((w as f64 / src_aspect).round() as u32).max(tgt_h);
        (w, h)
    }
}

/// Pick the start offset of a `window`-long run with the most energy.
///
/// `profile` holds one energy value per column (or row) of the overflowing
/// axis. Ties resolve toward the centred window, so a flat profile behaves
/// like a centre crop.
pub fn best_window_offset(profile: &[u64], window: usize) -> usize {
    if window == 0 || window >= profile.len() {
        return 0;
    }

    let slack = profile.len() - window;
    let centre = slack / 2;
    let mut sum: u64 = profile[..window].iter().sum();
    let mut best: usize = 0;
    let mut best_sum = sum;

    for offset in 1..=slack {
        sum = sum - profile[offset - 1] + profile[offset + window - 1];
        let closer = offset.abs_diff(centre) < best.abs_diff(centre);
        if sum > best_sum || (sum == best_sum && closer) {
            best = offset;
            best_sum = sum;
        }
    }

    best
}
