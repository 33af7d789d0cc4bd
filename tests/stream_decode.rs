//! Pipeline properties: decoder → classifier → accumulator, independent of
//! any network transport.

use chatflow_rs::accumulator::StreamAccumulators;
use chatflow_rs::store::MessageId;
use chatflow_rs::stream::{EventClassifier, LineBatch, LineDecoder, StreamEvent};

fn run_pipeline(chunks: &[&[u8]]) -> Vec<StreamEvent> {
    let mut decoder = LineDecoder::new();
    let mut classifier = EventClassifier::new();
    let mut lines = LineBatch::new();
    let mut events = Vec::new();
    for chunk in chunks {
        lines.clear();
        decoder.feed_into(chunk, &mut lines);
        for line in &lines {
            classifier.classify_into(line, &mut events);
        }
    }
    if let Some(tail) = decoder.finish() {
        classifier.classify_into(&tail, &mut events);
    }
    events
}

fn delta_contents(events: &[StreamEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            StreamEvent::Delta {
                content: Some(content),
                ..
            } => Some(content.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_every_chunk_split_yields_same_events() {
    let body = concat!(
        "event: metadata\n",
        "data: {\"final_model_used_for_generation\":\"x-ai/grok-3-mini-beta\"}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"caf\u{e9}\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\" \u{1f600}\"}}]}\n\n",
        "data: [DONE]\n\n"
    )
    .as_bytes();

    let expected = run_pipeline(&[body]);
    assert_eq!(
        delta_contents(&expected),
        vec!["caf\u{e9}".to_string(), " \u{1f600}".to_string()]
    );
    assert!(expected.contains(&StreamEvent::Model("x-ai/grok-3-mini-beta".to_string())));
    assert!(expected.contains(&StreamEvent::Done));

    // Any split point — including inside multi-byte characters and inside
    // the metadata event/data pair — must produce identical events.
    for split in 0..=body.len() {
        let events = run_pipeline(&[&body[..split], &body[split..]]);
        assert_eq!(events, expected, "split at byte {split}");
    }
}

#[test]
fn test_data_line_count_is_preserved_across_splits() {
    let mut body = Vec::new();
    for idx in 0..8 {
        body.extend_from_slice(
            format!("data: {{\"choices\":[{{\"delta\":{{\"content\":\"t{idx}\"}}}}]}}\n").as_bytes(),
        );
    }

    for chunk_size in [1usize, 2, 3, 5, 7, 16, 64, body.len()] {
        let chunks: Vec<&[u8]> = body.chunks(chunk_size).collect();
        let events = run_pipeline(&chunks);
        let contents = delta_contents(&events);
        assert_eq!(contents.len(), 8, "chunk size {chunk_size}");
        for (idx, content) in contents.iter().enumerate() {
            assert_eq!(content, &format!("t{idx}"));
        }
    }
}

#[test]
fn test_done_sentinel_never_reaches_the_accumulator() {
    let accumulators = StreamAccumulators::new();
    let id = MessageId::from_u128(7);
    accumulators.insert(id);

    let events = run_pipeline(&[b"data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n\ndata: [DONE]\n\n"]);
    for event in events {
        if let StreamEvent::Delta { content, reasoning } = event {
            accumulators.append(id, content.as_deref(), reasoning.as_deref());
        }
    }

    let acc = accumulators.snapshot(id).unwrap();
    assert_eq!(acc.content, "hi");
    assert!(acc.reasoning.is_empty());
}

#[test]
fn test_malformed_payload_skipped_midstream() {
    let events = run_pipeline(&[
        b"data: {\"choices\":[{\"delta\":{\"content\":\"before\"}}]}\n",
        b"data: {this is not json}\n",
        b"data: {\"choices\":[{\"delta\":{\"content\":\" after\"}}]}\n",
    ]);
    assert_eq!(
        delta_contents(&events),
        vec!["before".to_string(), " after".to_string()]
    );
}

#[test]
fn test_unterminated_final_data_line_is_recovered() {
    let events = run_pipeline(&[
        b"data: {\"choices\":[{\"delta\":{\"content\":\"body\"}}]}\n\n",
        b"data: {\"choices\":[{\"delta\":{\"content\":\" tail\"}}]}",
    ]);
    assert_eq!(
        delta_contents(&events),
        vec!["body".to_string(), " tail".to_string()]
    );
}

#[test]
fn test_interleaved_channels_accumulate_independently() {
    let accumulators = StreamAccumulators::new();
    let id = MessageId::from_u128(9);
    accumulators.insert(id);

    let events = run_pipeline(&[concat!(
        "data: {\"choices\":[{\"delta\":{\"reasoning\":\"Let\"}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"Sure\"}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"reasoning\":\"me\"}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\", here\"}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"reasoning\":\"think\"}}]}\n",
    )
    .as_bytes()]);
    for event in events {
        if let StreamEvent::Delta { content, reasoning } = event {
            accumulators.append(id, content.as_deref(), reasoning.as_deref());
        }
    }

    let acc = accumulators.snapshot(id).unwrap();
    assert_eq!(acc.content, "Sure, here");
    assert_eq!(acc.reasoning, "Letmethink");
}
