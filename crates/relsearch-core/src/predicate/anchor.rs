///
/// Anchor
///
/// Where a text-pattern match is anchored (§4.5): `CONTAINS` has no
/// anchor, `STARTS_WITH`/`ENDS_WITH` anchor one side.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Anchor {
    Start,
    End,
    Both,
}
