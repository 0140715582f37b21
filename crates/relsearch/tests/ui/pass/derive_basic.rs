use relsearch::metamodel::{AttributeKind, AttributeModel, EntityModel, ScalarKind};
use relsearch::SearchDto;

static WIDGET_MODEL: &EntityModel = &EntityModel {
    path: "ui::Widget",
    entity_name: "Widget",
    primary_key: &["id"],
    attributes: &[
        AttributeModel {
            name: "id",
            kind: AttributeKind::SingleBasic(ScalarKind::Long),
            json_encoded: false,
        },
        AttributeModel {
            name: "label",
            kind: AttributeKind::SingleBasic(ScalarKind::Text),
            json_encoded: false,
        },
    ],
};

#[derive(SearchDto)]
#[search(entity = WIDGET_MODEL)]
struct WidgetDto {
    #[search(sortable)]
    id: i64,
    #[search(ops = "equals, contains", sortable)]
    label: String,
    #[search(skip)]
    internal: String,
}

fn main() {}
