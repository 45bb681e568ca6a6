//! End-to-end coordinator tests over the in-memory transport.

use regmap_core::codec::Value;
use regmap_core::parse_mapping;
use regmap_device::{DeviceCoordinator, DeviceError, MemoryTransport};

const MAPPING: &str = r#"
device:
  name: Test Heat Pump
  manufacturer: Acme
  model: HP-1
entities:
  - platform: sensor
    key: outside_temp
    unit: "°C"
    read:
      address: 100
      data_type: int16
      scale: 0.1
  - platform: sensor
    key: energy_total
    read:
      address: 110
      data_type: uint32
  - platform: sensor
    key: flow_rate
    read:
      address: 120
      data_type: float32
      word_order: BA
  - platform: binary_sensor
    key: compressor_on
    read:
      address: 130
      bit: 2
  - platform: number
    key: setpoint
    minimum: 10
    maximum: 35
    read:
      address: 140
      data_type: int16
      scale: 0.5
    write:
      address: 140
      scale: 0.5
  - platform: switch
    key: boost
    read:
      address: 150
      bit: 3
    write:
      address: 150
      bit: 3
  - platform: select
    key: mode
    read:
      address: 160
    write:
      address: 160
    options:
      - "Off"
      - "Auto"
      - label: Eco
        value: 7
  - platform: button
    key: reset_alarms
    press_value: 99
    write:
      address: 170
"#;

fn coordinator(transport: MemoryTransport) -> DeviceCoordinator<MemoryTransport> {
    let mapping = parse_mapping(MAPPING, "test.yaml").expect("mapping is valid");
    DeviceCoordinator::new(mapping, transport)
}

#[tokio::test]
async fn test_poll_decodes_all_readable_entities() {
    let mut transport = MemoryTransport::new();
    transport.set_register(100, 0xFFF6); // -10 raw -> -1.0 °C
    transport.set_register(110, 0x0001); // uint32 high word
    transport.set_register(111, 0x0000); // -> 65536
    transport.set_register(120, 0x0FDB); // float32, BA order
    transport.set_register(121, 0x4049); // -> ~3.14159
    transport.set_register(130, 0b0100); // bit 2 set
    transport.set_register(140, 42); // 42 * 0.5 = 21.0
    transport.set_register(160, 7); // mode Eco

    let coordinator = coordinator(transport);
    let data = coordinator.poll_once().await.unwrap();

    assert_eq!(data.len(), 7); // button is write-only
    match data["outside_temp"] {
        Value::Float(v) => assert!((v + 1.0).abs() < 1e-9),
        ref other => panic!("expected float, got {:?}", other),
    }
    assert_eq!(data["energy_total"], Value::Integer(65536));
    match data["flow_rate"] {
        Value::Float(v) => assert!((v - 3.14159).abs() < 1e-4),
        ref other => panic!("expected float, got {:?}", other),
    }
    assert_eq!(data["compressor_on"], Value::Boolean(true));
    assert_eq!(data["mode"], Value::Integer(7));
}

#[tokio::test]
async fn test_number_write_applies_scale() {
    let coordinator = coordinator(MemoryTransport::new());
    coordinator.write_value("setpoint", 21.5).await.unwrap();
    // 21.5 / 0.5 = 43
    assert_eq!(coordinator.into_transport().register(140), 43);
}

#[tokio::test]
async fn test_switch_bit_write_preserves_other_bits() {
    let mut transport = MemoryTransport::new();
    transport.set_register(150, 0x0002);

    let coordinator = coordinator(transport);
    coordinator.write_switch("boost", true).await.unwrap();
    coordinator.write_switch("boost", false).await.unwrap();

    // bit 3 toggled on then off; bit 1 untouched throughout
    let transport = coordinator.into_transport();
    assert_eq!(transport.register(150), 0x0002);
}

#[tokio::test]
async fn test_switch_bit_write_sets_bit() {
    let mut transport = MemoryTransport::new();
    transport.set_register(150, 0x0002);

    let coordinator = coordinator(transport);
    coordinator.write_switch("boost", true).await.unwrap();
    assert_eq!(coordinator.into_transport().register(150), 0x000A);
}

#[tokio::test]
async fn test_button_press_writes_press_value() {
    let coordinator = coordinator(MemoryTransport::new());
    coordinator.press("reset_alarms").await.unwrap();
    assert_eq!(coordinator.into_transport().register(170), 99);
}

#[tokio::test]
async fn test_select_maps_label_to_value() {
    let coordinator = coordinator(MemoryTransport::new());

    coordinator.select_option("mode", "Eco").await.unwrap();
    {
        let data = coordinator.poll_once().await.unwrap();
        assert_eq!(data["mode"], Value::Integer(7));
    }

    // Plain labels take their list index as value.
    coordinator.select_option("mode", "Auto").await.unwrap();
    let data = coordinator.poll_once().await.unwrap();
    assert_eq!(data["mode"], Value::Integer(1));
}

#[tokio::test]
async fn test_select_unknown_label() {
    let coordinator = coordinator(MemoryTransport::new());
    let err = coordinator.select_option("mode", "Turbo").await.unwrap_err();
    assert!(matches!(err, DeviceError::UnknownOption { .. }));
}

#[tokio::test]
async fn test_write_to_read_only_entity() {
    let coordinator = coordinator(MemoryTransport::new());
    let err = coordinator.write_value("outside_temp", 1.0).await.unwrap_err();
    assert!(matches!(err, DeviceError::NotWritable { .. }));
}

#[tokio::test]
async fn test_unknown_key() {
    let coordinator = coordinator(MemoryTransport::new());
    let err = coordinator.write_value("nope", 1.0).await.unwrap_err();
    assert!(matches!(err, DeviceError::UnknownKey(_)));
}

#[tokio::test]
async fn test_out_of_range_write_surfaces_key() {
    let coordinator = coordinator(MemoryTransport::new());
    // 40000 / 0.5 = 80000, past the 16-bit range
    let err = coordinator.write_value("setpoint", 40000.0).await.unwrap_err();
    assert!(err.to_string().contains("setpoint"));
    assert!(matches!(err, DeviceError::Codec { .. }));
}

#[tokio::test]
async fn test_single_transient_failure_is_retried() {
    let mut transport = MemoryTransport::new();
    transport.set_register(100, 10);
    transport.fail_next(1);

    let coordinator = coordinator(transport);
    let data = coordinator.poll_once().await.unwrap();
    match data["outside_temp"] {
        Value::Float(v) => assert!((v - 1.0).abs() < 1e-9),
        ref other => panic!("expected float, got {:?}", other),
    }
}

#[tokio::test]
async fn test_persistent_failure_surfaces_transport_error() {
    let mut transport = MemoryTransport::new();
    transport.fail_next(2);

    let coordinator = coordinator(transport);
    let err = coordinator.poll_once().await.unwrap_err();
    assert!(matches!(err, DeviceError::Transport { .. }));
}
