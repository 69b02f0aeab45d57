//! Integration tests for dmxpro-client.
//!
//! The device side of each test is an in-memory duplex pipe scripted
//! to behave like the widget: read the parameter request, send the
//! reply, then observe the DMX output stream.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::time::timeout;

use dmxpro_client::protocol::{build_packet, decode_packet, PacketBuffer};
use dmxpro_client::{FrameBuffer, Packet, WidgetClient, WidgetHandler, WidgetParameters};

/// The 5-byte parameter block used by every scripted device:
/// firmware 300 (0x012C), break 9, MAB 1, rate 40.
const PARAMS_PAYLOAD: [u8; 5] = [0x2C, 0x01, 9, 1, 40];

/// Handler that records every hook invocation behind shared state.
#[derive(Clone, Default)]
struct Recorder {
    ready: Arc<Mutex<Option<WidgetParameters>>>,
    steps: Arc<Mutex<Vec<f64>>>,
    packets: Arc<Mutex<Vec<Packet>>>,
}

impl WidgetHandler for Recorder {
    fn on_ready(&mut self, params: &WidgetParameters, _frame: &mut FrameBuffer) {
        *self.ready.lock().unwrap() = Some(*params);
    }

    fn on_tick(&mut self, step: f64, _frame: &mut FrameBuffer) {
        self.steps.lock().unwrap().push(step);
    }

    fn on_packet(&mut self, packet: &Packet) {
        self.packets.lock().unwrap().push(packet.clone());
    }
}

/// Read the parameter request off the device side and answer it.
async fn answer_handshake(device: &mut DuplexStream) {
    let mut request = [0u8; 7];
    device.read_exact(&mut request).await.unwrap();
    assert_eq!(request, [0x7E, 0x03, 0x02, 0x00, 0x00, 0x00, 0xE7]);

    let reply = build_packet(3, &PARAMS_PAYLOAD).unwrap();
    device.write_all(&reply).await.unwrap();
}

#[tokio::test]
async fn test_handshake_discovers_parameters() {
    let (transport, mut device) = duplex(4096);

    let recorder = Recorder::default();
    let client = WidgetClient::builder()
        .handler(recorder.clone())
        .manual_render()
        .start(transport)
        .await
        .unwrap();

    answer_handshake(&mut device).await;

    let params = timeout(Duration::from_secs(1), client.ready())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(params.firmware_version, 300);
    assert_eq!(params.break_time, 9);
    assert_eq!(params.mark_after_break_time, 1);
    assert_eq!(params.output_rate, 40);

    // The on_ready hook saw the same values
    assert_eq!(recorder.ready.lock().unwrap().unwrap(), params);
    assert_eq!(client.parameters(), Some(params));
}

#[tokio::test]
async fn test_handshake_survives_byte_at_a_time_delivery() {
    let (transport, mut device) = duplex(4096);

    let client = WidgetClient::builder()
        .manual_render()
        .start(transport)
        .await
        .unwrap();

    let mut request = [0u8; 7];
    device.read_exact(&mut request).await.unwrap();

    let reply = build_packet(3, &PARAMS_PAYLOAD).unwrap();
    for byte in reply {
        device.write_all(&[byte]).await.unwrap();
        device.flush().await.unwrap();
    }

    let params = timeout(Duration::from_secs(1), client.ready())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(params.firmware_version, 300);
}

#[tokio::test]
async fn test_render_loop_streams_default_universe() {
    let (transport, mut device) = duplex(4096);

    let recorder = Recorder::default();
    let _client = WidgetClient::builder()
        .handler(recorder.clone())
        .interval(Duration::from_millis(10))
        .start(transport)
        .await
        .unwrap();

    answer_handshake(&mut device).await;

    // First output packet: label 6, start code 0, 24 zero channels
    let mut expected = vec![0x7E, 0x06, 25, 0x00, 0x00];
    expected.extend_from_slice(&[0u8; 24]);
    expected.push(0xE7);

    let mut first = vec![0u8; expected.len()];
    timeout(Duration::from_secs(1), device.read_exact(&mut first))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, expected);

    // The loop keeps streaming and the step counter advances by the
    // interval each tick
    let mut second = vec![0u8; expected.len()];
    timeout(Duration::from_secs(1), device.read_exact(&mut second))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second, expected);

    let steps = recorder.steps.lock().unwrap();
    assert!(steps.len() >= 2);
    assert!((steps[0] - 0.01).abs() < 1e-9);
    assert!(steps[1] > steps[0]);
}

#[tokio::test]
async fn test_tick_hook_mutations_reach_the_wire() {
    struct Ramp;

    impl WidgetHandler for Ramp {
        fn on_tick(&mut self, _step: f64, frame: &mut FrameBuffer) {
            frame.fill(0x42);
        }
    }

    let (transport, mut device) = duplex(4096);

    let _client = WidgetClient::builder()
        .handler(Ramp)
        .universe_size(4)
        .start(transport)
        .await
        .unwrap();

    answer_handshake(&mut device).await;

    let mut packet = [0u8; 10]; // 4 header + 5 payload + sentinel
    timeout(Duration::from_secs(1), device.read_exact(&mut packet))
        .await
        .unwrap()
        .unwrap();

    let (decoded, _) = decode_packet(&packet).unwrap().unwrap();
    assert!(decoded.is_dmx_output());
    assert_eq!(decoded.payload(), &[0x00, 0x42, 0x42, 0x42, 0x42]);
}

#[tokio::test]
async fn test_configure_sends_parameter_block() {
    let (transport, mut device) = duplex(4096);

    let client = WidgetClient::builder()
        .manual_render()
        .start(transport)
        .await
        .unwrap();

    answer_handshake(&mut device).await;
    client.ready().await.unwrap();

    let params = WidgetParameters {
        firmware_version: 300,
        break_time: 12,
        mark_after_break_time: 2,
        output_rate: 30,
    };
    client.configure(&params).await.unwrap();

    let mut packet = [0u8; 10];
    device.read_exact(&mut packet).await.unwrap();
    assert_eq!(packet, [0x7E, 0x04, 0x05, 0x00, 0x2C, 0x01, 12, 2, 30, 0xE7]);
}

#[tokio::test]
async fn test_manual_render_sends_one_packet() {
    let (transport, mut device) = duplex(4096);

    let client = WidgetClient::builder()
        .manual_render()
        .start(transport)
        .await
        .unwrap();

    answer_handshake(&mut device).await;
    client.ready().await.unwrap();

    let mut frame = FrameBuffer::new(3);
    frame.set(1, 200);
    client.render(&frame).await.unwrap();

    let mut packet = [0u8; 9];
    device.read_exact(&mut packet).await.unwrap();
    assert_eq!(packet, [0x7E, 0x06, 0x04, 0x00, 0x00, 0, 200, 0, 0xE7]);
}

#[tokio::test]
async fn test_unhandled_packets_reach_the_handler() {
    let (transport, mut device) = duplex(4096);

    let recorder = Recorder::default();
    let client = WidgetClient::builder()
        .handler(recorder.clone())
        .manual_render()
        .start(transport)
        .await
        .unwrap();

    answer_handshake(&mut device).await;
    client.ready().await.unwrap();

    // An unknown label, then a parameter reply outside the handshake:
    // both are forwarded, neither is an error
    device
        .write_all(&build_packet(9, b"vendor").unwrap())
        .await
        .unwrap();
    device
        .write_all(&build_packet(3, &PARAMS_PAYLOAD).unwrap())
        .await
        .unwrap();

    timeout(Duration::from_secs(1), async {
        loop {
            if recorder.packets.lock().unwrap().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    let packets = recorder.packets.lock().unwrap();
    assert_eq!(packets[0].label, 9);
    assert_eq!(packets[0].payload(), b"vendor");
    assert_eq!(packets[1].label, 3);

    // The handshake did not re-run: parameters are unchanged
    assert_eq!(client.parameters().unwrap().firmware_version, 300);
}

#[tokio::test]
async fn test_framing_error_ends_the_session() {
    let (transport, mut device) = duplex(4096);

    let client = WidgetClient::builder()
        .manual_render()
        .start(transport)
        .await
        .unwrap();

    let mut request = [0u8; 7];
    device.read_exact(&mut request).await.unwrap();

    // Desynchronized stream: first byte is not the start sentinel
    device.write_all(&[0x00, 0x03, 0x02, 0x00]).await.unwrap();

    timeout(Duration::from_secs(1), client.wait_for_shutdown())
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_transport_close_ends_the_session() {
    let (transport, mut device) = duplex(4096);

    let client = WidgetClient::builder()
        .manual_render()
        .start(transport)
        .await
        .unwrap();

    let mut request = [0u8; 7];
    device.read_exact(&mut request).await.unwrap();
    drop(device);

    timeout(Duration::from_secs(1), client.wait_for_shutdown())
        .await
        .unwrap()
        .unwrap();
}

/// Reassembling the full scripted exchange from one concatenated chunk
/// preserves packet order.
#[test]
fn test_concatenated_stream_reassembly() {
    let mut stream = Vec::new();
    stream.extend(build_packet(3, &PARAMS_PAYLOAD).unwrap());
    stream.extend(build_packet(9, b"vendor").unwrap());
    stream.extend(build_packet(6, &[0, 1, 2, 3]).unwrap());

    let mut buffer = PacketBuffer::new();
    let packets = buffer.push(&stream).unwrap();

    assert_eq!(packets.len(), 3);
    assert_eq!(packets[0].label, 3);
    assert_eq!(packets[1].label, 9);
    assert_eq!(packets[2].label, 6);
    assert!(buffer.is_empty());
}
