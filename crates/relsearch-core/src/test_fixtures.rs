//! Hand-declared `EntityModel`s for a small blog schema, shared by unit and
//! integration tests across this crate: `User` —< `Post` —< `Comment` >— `User`.
#![cfg(test)]

use crate::metamodel::{AttributeKind, AttributeModel, EntityModel, ScalarKind};

static USER_MODEL_VAL: EntityModel = EntityModel {
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
        AttributeModel {
            name: "posts",
            kind: AttributeKind::OneToMany { target: POST_MODEL },
            json_encoded: false,
        },
    ],
};
pub static USER_MODEL: &EntityModel = &USER_MODEL_VAL;

static POST_MODEL_VAL: EntityModel = EntityModel {
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
        AttributeModel {
            name: "comments",
            kind: AttributeKind::OneToMany {
                target: COMMENT_MODEL,
            },
            json_encoded: false,
        },
        AttributeModel {
            name: "tags",
            kind: AttributeKind::ManyToMany { target: TAG_MODEL },
            json_encoded: false,
        },
    ],
};
pub static POST_MODEL: &EntityModel = &POST_MODEL_VAL;

pub static TAG_MODEL: &EntityModel = &EntityModel {
    path: "fixtures::Tag",
    entity_name: "Tag",
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

/// A composite-key entity (`tenantId`, `entityId`) for exercising S6/P9.
pub static TENANT_SCOPED_MODEL: &EntityModel = &EntityModel {
    path: "fixtures::TenantScoped",
    entity_name: "TenantScoped",
    primary_key: &["tenantId", "entityId"],
    attributes: &[
        AttributeModel {
            name: "tenantId",
            kind: AttributeKind::SingleBasic(ScalarKind::Text),
            json_encoded: false,
        },
        AttributeModel {
            name: "entityId",
            kind: AttributeKind::SingleBasic(ScalarKind::Long),
            json_encoded: false,
        },
    ],
};

static COMMENT_MODEL_VAL: EntityModel = EntityModel {
    path: "fixtures::Comment",
    entity_name: "Comment",
    primary_key: &["id"],
    attributes: &[
        AttributeModel {
            name: "id",
            kind: AttributeKind::SingleBasic(ScalarKind::Long),
            json_encoded: false,
        },
        AttributeModel {
            name: "body",
            kind: AttributeKind::SingleBasic(ScalarKind::Text),
            json_encoded: false,
        },
        AttributeModel {
            name: "post",
            kind: AttributeKind::ManyToOne { target: POST_MODEL },
            json_encoded: false,
        },
        AttributeModel {
            name: "author",
            kind: AttributeKind::ManyToOne { target: USER_MODEL },
            json_encoded: false,
        },
    ],
};
pub static COMMENT_MODEL: &EntityModel = &COMMENT_MODEL_VAL;
