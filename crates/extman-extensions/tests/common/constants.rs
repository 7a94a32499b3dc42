//! Test constants for extman-extensions tests

#![allow(dead_code)]

pub const FAKE_DRIVER_NAME: &str = "fakeDriver";
pub const FAKE_DRIVER_PACKAGE: &str = "fake-driver";
pub const FAKE_DRIVER_CLASS: &str = "FakeDriver";

pub const FAKE_PLUGIN_NAME: &str = "fakePlugin";
pub const FAKE_PLUGIN_PACKAGE: &str = "fake-plugin";
pub const FAKE_PLUGIN_CLASS: &str = "FakePlugin";

pub const TEST_VERSION: &str = "1.0.0";

/// Entry module of the fake driver package
pub const FAKE_DRIVER_SOURCE: &str = r#"
const { BaseDriver } = require('base-driver');

class FakeDriver extends BaseDriver {}

module.exports = { FakeDriver, default: FakeDriver };
"#;

/// Entry module of the fake plugin package
pub const FAKE_PLUGIN_SOURCE: &str = r#"
import BasePlugin from 'base-plugin';

export class FakePlugin extends BasePlugin {}
export default FakePlugin;
"#;

/// Options schema shipped with the fake driver
pub const FAKE_DRIVER_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "sillyWebServerPort": { "type": "integer", "minimum": 1, "maximum": 65535 }
  },
  "additionalProperties": false
}"#;
