///
/// Pagination
///
/// `(page, size)` with `page ≥ 0`, `size ∈ [1, MAX_SIZE]` (§4.9). Bounds are
/// enforced by `SearchConfig::clamp_size` and the builder's `page()` clamp
/// before a `Pagination` is ever constructed, so this type carries no
/// further validation of its own.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
}

impl Pagination {
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }
}
