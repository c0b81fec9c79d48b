//! Ordinal remark bands over the predicted grade. Thresholds are
//! inclusive lower bounds, checked top-down.

pub fn remark_for(score: f64) -> &'static str {
    if score >= 18.0 {
        "A+ (Excellent)"
    } else if score >= 16.0 {
        "A (Very Good)"
    } else if score >= 14.0 {
        "B+ (Good)"
    } else if score >= 12.0 {
        "B (Average)"
    } else if score >= 10.0 {
        "C (Below Avg)"
    } else {
        "D (Poor)"
    }
}
