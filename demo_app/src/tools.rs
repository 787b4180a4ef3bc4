use crate::{
    registry::{RegistryError, ToolDescriptor, ToolRegistry},
    schema::{
        Arguments, FieldDefault, FieldDescriptor, FieldType, SchemaDescriptor, ToolInput,
        ValidationError, Violation,
    },
    widget::WIDGET_URI,
};
use demo_app_protocol::Meta;
use serde_json::Value;
use std::{fmt, str::FromStr};

/// The tools this server knows. Anything else is answered with an error result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoTool {
    Increment,
    Decrement,
    Reset,
}

impl DemoTool {
    /// Declaration order, which is also listing order.
    pub const ALL: [DemoTool; 3] = [DemoTool::Increment, DemoTool::Decrement, DemoTool::Reset];

    pub const fn name(&self) -> &'static str {
        match self {
            DemoTool::Increment => "increment",
            DemoTool::Decrement => "decrement",
            DemoTool::Reset => "reset",
        }
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        let (title, description, input_schema, invoking, invoked) = match self {
            DemoTool::Increment => (
                "Increment demo",
                "Increments the demo by a specified amount (default: 1).",
                IncrementInput::SCHEMA,
                "Incrementing demo",
                "Incremented demo",
            ),
            DemoTool::Decrement => (
                "Decrement demo",
                "Decrements the demo by a specified amount (default: 1).",
                DecrementInput::SCHEMA,
                "Decrementing demo",
                "Decremented demo",
            ),
            DemoTool::Reset => (
                "Reset demo",
                "Resets the demo to zero.",
                ResetInput::SCHEMA,
                "Resetting demo",
                "Reset demo",
            ),
        };

        let mut invocation_meta = Meta::new();
        invocation_meta.insert("openai/outputTemplate".into(), Value::from(WIDGET_URI));
        invocation_meta.insert("openai/toolInvocation/invoking".into(), Value::from(invoking));
        invocation_meta.insert("openai/toolInvocation/invoked".into(), Value::from(invoked));
        if *self == DemoTool::Reset {
            invocation_meta.insert("openai/widgetAccessible".into(), Value::Bool(true));
        }

        ToolDescriptor {
            name: self.name(),
            title,
            description,
            input_schema,
            invocation_meta,
        }
    }
}

impl fmt::Display for DemoTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The name didn't match any known tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTool(pub String);

impl FromStr for DemoTool {
    type Err = UnknownTool;

    /// Exact, case-sensitive match on the tool name.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        DemoTool::ALL
            .into_iter()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| UnknownTool(name.to_string()))
    }
}

/// The catalog advertised by `tools/list`.
pub fn demo_tools() -> Result<ToolRegistry, RegistryError> {
    ToolRegistry::new(DemoTool::ALL.iter().map(DemoTool::descriptor))
}

const INCREMENT_FIELDS: &[FieldDescriptor] = &[FieldDescriptor::new(
    "amount",
    FieldType::Integer,
    "The amount to increment by (default: 1)",
)
.with_default(FieldDefault::Integer(1))];

const DECREMENT_FIELDS: &[FieldDescriptor] = &[FieldDescriptor::new(
    "amount",
    FieldType::Integer,
    "The amount to decrement by (default: 1)",
)
.with_default(FieldDefault::Integer(1))];

fn amount(args: &Arguments) -> Result<i64, ValidationError> {
    args.integer("amount").ok_or_else(|| {
        Violation::MissingRequiredField {
            field: "amount".to_string(),
        }
        .into()
    })
}

/// Arguments to `increment`. Zero and negative amounts are applied as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncrementInput {
    pub amount: i64,
}

impl ToolInput for IncrementInput {
    const SCHEMA: SchemaDescriptor = SchemaDescriptor::new(INCREMENT_FIELDS).deny_unknown_fields();

    fn from_arguments(args: &Arguments) -> Result<Self, ValidationError> {
        Ok(Self {
            amount: amount(args)?,
        })
    }
}

/// Arguments to `decrement`. Zero and negative amounts are applied as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecrementInput {
    pub amount: i64,
}

impl ToolInput for DecrementInput {
    const SCHEMA: SchemaDescriptor = SchemaDescriptor::new(DECREMENT_FIELDS).deny_unknown_fields();

    fn from_arguments(args: &Arguments) -> Result<Self, ValidationError> {
        Ok(Self {
            amount: amount(args)?,
        })
    }
}

/// `reset` takes no arguments at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetInput;

impl ToolInput for ResetInput {
    const SCHEMA: SchemaDescriptor = SchemaDescriptor::new(&[]).deny_unknown_fields();

    fn from_arguments(_args: &Arguments) -> Result<Self, ValidationError> {
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn raw(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test arguments must be an object"),
        }
    }

    #[test]
    fn names_parse_exactly() {
        assert_eq!("increment".parse::<DemoTool>(), Ok(DemoTool::Increment));
        assert_eq!("decrement".parse::<DemoTool>(), Ok(DemoTool::Decrement));
        assert_eq!("reset".parse::<DemoTool>(), Ok(DemoTool::Reset));
        assert_eq!(
            "Increment".parse::<DemoTool>(),
            Err(UnknownTool("Increment".to_string()))
        );
        assert!(" reset".parse::<DemoTool>().is_err());
    }

    #[test]
    fn increment_input() {
        assert_eq!(
            IncrementInput::parse(&raw(json!({}))),
            Ok(IncrementInput { amount: 1 })
        );
        assert_eq!(
            IncrementInput::parse(&raw(json!({"amount": 5}))),
            Ok(IncrementInput { amount: 5 })
        );
        assert!(IncrementInput::parse(&raw(json!({"amount": "x"}))).is_err());
        assert!(IncrementInput::parse(&raw(json!({"amount": 1, "extra": true}))).is_err());
    }

    #[test]
    fn reset_rejects_any_field() {
        assert_eq!(ResetInput::parse(&Map::new()), Ok(ResetInput));
        let err = ResetInput::parse(&raw(json!({"amount": 1}))).unwrap_err();
        assert_eq!(
            err.violations(),
            &[Violation::UnknownField {
                field: "amount".into()
            }]
        );
    }

    #[test]
    fn catalog_in_declaration_order() {
        let tools = demo_tools().unwrap();
        let names: Vec<_> = tools.list().iter().map(|t| t.name).collect();
        assert_eq!(names, ["increment", "decrement", "reset"]);
    }

    #[test]
    fn invocation_meta() {
        let reset = DemoTool::Reset.descriptor();
        assert_eq!(
            Value::Object(reset.invocation_meta),
            json!({
                "openai/outputTemplate": "ui://widget/demo.html",
                "openai/toolInvocation/invoking": "Resetting demo",
                "openai/toolInvocation/invoked": "Reset demo",
                "openai/widgetAccessible": true
            })
        );

        let increment = DemoTool::Increment.descriptor();
        assert!(!increment.invocation_meta.contains_key("openai/widgetAccessible"));
    }

    #[test]
    fn advertised_schemas() {
        assert_eq!(
            DemoTool::Decrement.descriptor().to_tool().input_schema,
            json!({
                "type": "object",
                "properties": {
                    "amount": {
                        "type": "integer",
                        "default": 1,
                        "description": "The amount to decrement by (default: 1)"
                    }
                },
                "additionalProperties": false
            })
        );
        assert_eq!(
            DemoTool::Reset.descriptor().to_tool().input_schema,
            json!({"type": "object", "properties": {}, "additionalProperties": false})
        );
    }

    #[test]
    fn schema_agrees_with_derived_schema() {
        #[allow(dead_code)]
        #[derive(schemars::JsonSchema)]
        struct Amount {
            amount: i64,
        }

        let derived = serde_json::to_value(schemars::schema_for!(Amount)).unwrap();
        let declared = IncrementInput::SCHEMA.to_json_schema();
        assert_eq!(
            derived["properties"]["amount"]["type"],
            declared["properties"]["amount"]["type"]
        );
        assert_eq!(derived["type"], declared["type"]);
    }
}
