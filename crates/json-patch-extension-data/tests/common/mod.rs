#![allow(dead_code)]

use json_patch_extension_data::{ExtensionData, FieldDescriptor, SinkAccessor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type ExtensionMap = Map<String, Value>;

/// Extension data on root level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MyClass {
    pub foo: Option<i32>,
    pub bar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_extension_data: Option<ExtensionMap>,
}

impl ExtensionData for MyClass {
    fn accessor() -> SinkAccessor<Self> {
        SinkAccessor::new().sink("MyExtensionData")
    }
}

/// A typed list next to the extension data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MyClassWithAList {
    pub foo: Option<i32>,
    pub bar: Option<String>,
    #[serde(default)]
    pub some_list: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_extension_data: Option<ExtensionMap>,
}

impl ExtensionData for MyClassWithAList {
    fn accessor() -> SinkAccessor<Self> {
        SinkAccessor::new().sink("MyExtensionData")
    }
}

/// Extension data one level down.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MyClassWithNesting {
    pub my_integer: i32,
    pub my_string: Option<String>,
    pub my_model: Option<MyClass>,
}

impl ExtensionData for MyClassWithNesting {
    fn accessor() -> SinkAccessor<Self> {
        SinkAccessor::new().field("MyModel").sink("MyExtensionData")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MyClassWithJsonNames {
    #[serde(rename = "somethingLikeFoo")]
    pub foo: i32,
    pub bar: Option<String>,
    #[serde(
        rename = "thePropertyWithTheExtensionData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub my_extension_data: Option<ExtensionMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MyClassWithNestingAndJsonNames {
    #[serde(rename = "mySAdasdasdInteger")]
    pub my_integer: i32,
    pub my_string: Option<String>,
    #[serde(rename = "moooooodel")]
    pub my_model: Option<MyClassWithJsonNames>,
}

impl ExtensionData for MyClassWithNestingAndJsonNames {
    fn accessor() -> SinkAccessor<Self> {
        SinkAccessor::new()
            .field(
                FieldDescriptor::new("MyModel")
                    .with_serde_name("moooooodel")
                    .with_patch_name("moooooodel"),
            )
            .sink(
                FieldDescriptor::new("MyExtensionData")
                    .with_serde_name("thePropertyWithTheExtensionData")
                    .with_patch_name("thePropertyWithTheExtensionData"),
            )
    }
}

/// Only the serde name is set on the extension data itself.
pub fn inconsistent_sink_accessor() -> SinkAccessor<MyClassWithJsonNames> {
    SinkAccessor::new()
        .sink(FieldDescriptor::new("MyExtensionData").with_serde_name("thePropertyWithTheExtensionData"))
}

/// The model member is renamed differently by the two schemes.
pub fn inconsistent_nested_accessor() -> SinkAccessor<MyClassWithNestingAndJsonNames> {
    SinkAccessor::new()
        .field(
            FieldDescriptor::new("MyModel")
                .with_serde_name("moooooodel")
                .with_patch_name("muuuuuudel"),
        )
        .sink(FieldDescriptor::new("MyExtensionData").with_serde_name("thePropertyWithTheExtensionData"))
}

pub fn extension_map<const N: usize>(entries: [(&str, Value); N]) -> ExtensionMap {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

pub fn nested_instance(extension_data: Option<ExtensionMap>) -> MyClassWithNesting {
    MyClassWithNesting {
        my_integer: 42,
        my_string: Some("asd".into()),
        my_model: Some(MyClass {
            foo: Some(17),
            bar: Some("Baz".into()),
            my_extension_data: extension_data,
        }),
    }
}
