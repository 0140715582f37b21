//! A tiny blog schema for the integration tests in this crate — its own
//! copy rather than `relsearch_core`'s internal fixtures, which are
//! `cfg(test)`-private to that crate and not visible from here.

use relsearch::metamodel::{AttributeKind, AttributeModel, EntityModel, ScalarKind};

pub static USER_MODEL: &EntityModel = &EntityModel {
    path: "fixtures::User",
    entity_name: "User",
    primary_key: &["id"],
    attributes: &[
        AttributeModel {
            name: "id",
            kind: AttributeKind::SingleBasic(ScalarKind::Long),
            json_encoded: false,
        },
        AttributeModel {
            name: "name",
            kind: AttributeKind::SingleBasic(ScalarKind::Text),
            json_encoded: false,
        },
    ],
};

pub static POST_MODEL: &EntityModel = &EntityModel {
    path: "fixtures::Post",
    entity_name: "Post",
    primary_key: &["id"],
    attributes: &[
        AttributeModel {
            name: "id",
            kind: AttributeKind::SingleBasic(ScalarKind::Long),
            json_encoded: false,
        },
        AttributeModel {
            name: "title",
            kind: AttributeKind::SingleBasic(ScalarKind::Text),
            json_encoded: false,
        },
        AttributeModel {
            name: "publishedAt",
            kind: AttributeKind::SingleBasic(ScalarKind::DateTime),
            json_encoded: false,
        },
        AttributeModel {
            name: "author",
            kind: AttributeKind::ManyToOne { target: USER_MODEL },
            json_encoded: false,
        },
    ],
};
