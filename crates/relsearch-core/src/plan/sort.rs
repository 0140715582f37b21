use crate::condition::{Direction, Order};
use crate::metamodel::EntityModel;

/// `normalize_sort(root, orders)` — appends the primary-key attribute(s)
/// in declared order, ascending, if not already present by attribute-name
/// match (I4). Pure and idempotent (P2):
/// `normalize_sort(normalize_sort(x)) == normalize_sort(x)`.
#[must_use]
pub fn normalize_sort(root: &'static EntityModel, orders: &[Order]) -> Vec<Order> {
    let mut normalized = orders.to_vec();

    for pk_attr in root.primary_key {
        let already_present = normalized.iter().any(|o| o.entity_field == *pk_attr);
        if !already_present {
            normalized.push(Order {
                dto_field: (*pk_attr).to_string(),
                entity_field: (*pk_attr).to_string(),
                direction: Direction::Asc,
            });
        }
    }

    normalized
}
