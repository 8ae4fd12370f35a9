//! # Template Tests
//!
//! Parsing rules, serialization shape and the default template generator.

use pretty_assertions::assert_eq;
use stackbridge_core::template::{Component, CustomComponent, Field, FieldKind, Node, default_template};
use stackbridge_core::{BridgeError, Template};

const SMALL: &str = r#"<?xml version="1.0"?>
<component id="root" name="root">
	<component id="system" name="system">
		<!-- cores -->
		<param name="number_of_cores" value="4"/>
		<stat name="total_cycles" value="%i"/>
		<component id="system.core" name="core">
			<param name="clock_rate" value="%i"/>
		</component>
	</component>
</component>
"#;

#[test]
fn test_parse_builds_tree() {
    let template = Template::parse(SMALL).unwrap();
    let system = template.system().unwrap();
    assert_eq!(system.id, "system");
    assert_eq!(system.value_of("number_of_cores"), Some("4"));

    let total = system.field("total_cycles").unwrap();
    assert_eq!(total.kind, FieldKind::Stat);

    let core = system.component("core").unwrap();
    assert_eq!(core.id, "system.core");
    assert_eq!(core.value_of("clock_rate"), Some("%i"));
}

#[test]
fn test_comments_are_kept_in_order() {
    let template = Template::parse(SMALL).unwrap();
    let system = template.system().unwrap();
    assert_eq!(system.children.first(), Some(&Node::Comment(" cores ".to_owned())));
}

#[test]
fn test_serialization_shape() {
    let template = Template::parse(SMALL).unwrap();
    let expected = "\
<component id=\"root\" name=\"root\">
\t<component id=\"system\" name=\"system\">
\t\t<!-- cores -->
\t\t<param name=\"number_of_cores\" value=\"4\"/>
\t\t<stat name=\"total_cycles\" value=\"%i\"/>
\t\t<component id=\"system.core\" name=\"core\">
\t\t\t<param name=\"clock_rate\" value=\"%i\"/>
\t\t</component>
\t</component>
</component>
";
    assert_eq!(template.to_xml(), expected);
}

#[test]
fn test_serialization_reparses_to_same_tree() {
    let template = default_template().unwrap();
    let reparsed = Template::parse(&template.to_xml()).unwrap();
    assert_eq!(reparsed, template);
}

#[test]
fn test_values_are_escaped() {
    let root = Component::new("root", "root")
        .with(Component::new("system", "system").with(Field::param("expr", "a < b & \"c\"")));
    let template = Template::new(root).unwrap();
    let xml = template.to_xml();
    assert!(xml.contains("value=\"a &lt; b &amp; &quot;c&quot;\""));

    let reparsed = Template::parse(&xml).unwrap();
    assert_eq!(reparsed.system().unwrap().value_of("expr"), Some("a < b & \"c\""));
}

#[test]
fn test_empty_document_is_fatal() {
    assert!(matches!(Template::parse(""), Err(BridgeError::EmptyTemplate)));
    assert!(matches!(Template::parse("<!-- nothing -->"), Err(BridgeError::EmptyTemplate)));
}

#[test]
fn test_root_without_system_is_fatal() {
    let err = Template::parse(r#"<component id="root" name="root"><param name="a" value="1"/></component>"#);
    assert!(matches!(err, Err(BridgeError::EmptyTemplate)));
}

#[test]
fn test_unknown_element_is_syntax_error() {
    let err = Template::parse(r#"<component id="root" name="root"><widget/></component>"#);
    assert!(matches!(err, Err(BridgeError::TemplateSyntax(_))));
}

#[test]
fn test_unclosed_element_is_syntax_error() {
    let err = Template::parse(r#"<component id="root" name="root"><component id="system" name="system">"#);
    assert!(matches!(err, Err(BridgeError::TemplateSyntax(_))));
}

#[test]
fn test_default_template_shape() {
    let template = default_template().unwrap();
    let system = template.system().unwrap();
    let names: Vec<&str> = system.components().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["core", "L20", "L30", "noc0", "mc", "niu", "pcie", "flashc"]
    );

    let core = system.component("core").unwrap();
    let parts: Vec<&str> = core.components().map(|c| c.name.as_str()).collect();
    assert_eq!(parts, vec!["PBT", "itlb", "icache", "dtlb", "dcache", "BTB"]);
}

#[test]
fn test_custom_component_is_appended_to_system() {
    let custom = CustomComponent::parse(
        r#"{ "component_name": "accel", "static": 0.5, "switch": 1.2,
             "frequency": 1000, "activation_factor": 0.3, "switch_count": 42, "interval": "1e-3" }"#,
    )
    .unwrap();

    let mut template = default_template().unwrap();
    template.add_custom_component(&custom).unwrap();

    let system = template.system().unwrap();
    let last = system.components().last().unwrap();
    assert_eq!(last.id, "system.accel");
    assert_eq!(last.name, "accel");

    let kinds: Vec<(FieldKind, &str, &str)> = last
        .fields()
        .map(|f| (f.kind, f.name.as_str(), f.value.as_str()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (FieldKind::Param, "static", "0.5"),
            (FieldKind::Param, "switch", "1.2"),
            (FieldKind::Stat, "frequency", "1000"),
            (FieldKind::Stat, "activation_factor", "0.3"),
            (FieldKind::Stat, "switch_count", "42"),
            (FieldKind::Stat, "interval", "1e-3"),
        ]
    );
}

#[test]
fn test_custom_component_from_yaml() {
    let custom = CustomComponent::parse(
        "component_name: accel\nstatic: 0.5\nswitch: 1.2\nfrequency: 1000\n\
         activation_factor: 0.3\nswitch_count: 42\ninterval: 0.001\n",
    )
    .unwrap();
    assert_eq!(custom.component_name, "accel");

    let component = custom.to_component().unwrap();
    assert_eq!(component.id, "system.accel");
    assert_eq!(component.value_of("static"), Some("0.5"));
    assert_eq!(component.value_of("switch"), Some("1.2"));
    assert_eq!(component.value_of("frequency"), Some("1000"));
    assert_eq!(component.value_of("activation_factor"), Some("0.3"));
    assert_eq!(component.value_of("switch_count"), Some("42"));
    assert_eq!(component.value_of("interval"), Some("0.001"));
}

#[test]
fn test_custom_component_load_reads_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accel.yaml");
    std::fs::write(
        &path,
        "# extra power block\ncomponent_name: npu\nstatic: 2\nswitch: 3\nfrequency: 800\n\
         activation_factor: 1\nswitch_count: 7\ninterval: '1e-3'\n",
    )
    .unwrap();

    let custom = CustomComponent::load(&path).unwrap();
    let component = custom.to_component().unwrap();
    assert_eq!(component.id, "system.npu");
    assert_eq!(component.value_of("static"), Some("2"));
    assert_eq!(component.value_of("interval"), Some("1e-3"));
}

#[test]
fn test_custom_component_rejects_structured_values() {
    let custom = CustomComponent::parse(
        r#"{ "component_name": "accel", "static": [1], "switch": 1,
             "frequency": 1, "activation_factor": 1, "switch_count": 1, "interval": 1 }"#,
    )
    .unwrap();
    assert!(matches!(custom.to_component(), Err(BridgeError::CustomComponent(_))));
}

#[test]
fn test_custom_component_requires_every_key() {
    let err = CustomComponent::parse(r#"{ "component_name": "accel" }"#);
    assert!(matches!(err, Err(BridgeError::CustomComponent(_))));
}
