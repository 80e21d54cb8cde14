//! Property coverage for FIFO accounting, the renderer, script coding and
//! sink sessions.

#![allow(clippy::pedantic, clippy::nursery, clippy::cast_possible_truncation)]

use dprintf_core::{
    invoke_script, render, DebugScript, DprintfError, DprintfFifoSink, DprintfRecord, FifoStatus,
    FormatTag, Lfsr, ScriptOp, SessionConfig, TagKind, MAX_PAD_TO,
};
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

fn script_op() -> impl Strategy<Value = ScriptOp> {
    prop_oneof![
        Just(ScriptOp::Status),
        (1_u16..=64, 1_u32..=0x1_0000)
            .prop_map(|(bytes, count)| ScriptOp::read(bytes * 8, count).expect("valid shape")),
        (1_u16..=64, 1_u32..=0x1_0000)
            .prop_map(|(bytes, count)| ScriptOp::read_err(bytes * 8, count).expect("valid shape")),
    ]
}

proptest! {
    #[test]
    fn property_status_tracks_a_counter_model(
        size in 0_u32..20,
        ops in proptest::collection::vec(any::<bool>(), 0..64),
    ) {
        let mut status = FifoStatus::with_capacity(size);
        let mut entries = 0_u32;
        let mut overflowed = false;
        let mut underflowed = false;

        for push in ops {
            if push {
                let accepted = status.push().is_ok();
                prop_assert_eq!(accepted, entries < size);
                if accepted { entries += 1 } else { overflowed = true }
            } else {
                let accepted = status.pop().is_ok();
                prop_assert_eq!(accepted, entries > 0);
                if accepted { entries -= 1 } else { underflowed = true }
            }

            prop_assert_eq!(status.entries_full(), entries);
            prop_assert_eq!(status.spaces_available(), size - entries);
            prop_assert_eq!(status.empty(), entries == 0);
            prop_assert_eq!(status.full(), entries == size);
            prop_assert_eq!(status.overflowed(), overflowed);
            prop_assert_eq!(status.underflowed(), underflowed);
        }
    }

    #[test]
    fn property_packed_word_reflects_status(size in 0_u32..40_000, fill in 0_u32..40_000) {
        let entries = fill.min(size);
        let status = FifoStatus::new(size, entries).expect("entries within size");
        let packed = FifoStatus::unpack(status.pack());

        prop_assert_eq!(packed.empty, entries == 0);
        prop_assert_eq!(packed.full, entries == size);
        prop_assert_eq!(packed.entries_full, entries.min(0x3FFF));
        prop_assert_eq!(packed.spaces_available, (size - entries).min(0x3FFF));
        prop_assert_eq!(packed.to_word(), status.pack());
    }

    #[test]
    fn property_render_is_total_and_rejects_only_wide_pads(
        program in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        match render(&program) {
            Ok(output) => prop_assert!(output.iter().all(|byte| (0x01..0x80).contains(byte))),
            Err(DprintfError::PadWidthOutOfRange { tag, pad_to, offset }) => {
                prop_assert!(pad_to > MAX_PAD_TO);
                prop_assert_eq!(program[offset], tag);
                prop_assert_eq!(FormatTag::classify(tag).kind(), TagKind::Decimal);
            }
        }
    }

    #[test]
    fn property_programs_without_decimal_tags_always_render(
        program in proptest::collection::vec(0_u8..0x90, 0..64),
    ) {
        prop_assert!(render(&program).is_ok());
    }

    #[test]
    fn property_printable_text_renders_to_itself(text in "[ -~]{0,80}") {
        let record = DprintfRecord::new(0, text.as_bytes().to_vec()).expect("printable");
        prop_assert_eq!(record.output(), text.as_bytes());
        prop_assert!(record.data_list().len() >= 4);
    }

    #[test]
    fn property_scripts_decode_to_the_ops_they_encode(
        ops in proptest::collection::vec(script_op(), 0..16),
    ) {
        let script: DebugScript = ops.iter().copied().collect();
        let decoded = DebugScript::decode(&script.encode()).expect("well formed");
        prop_assert_eq!(decoded.ops(), &ops[..]);
    }

    #[test]
    fn property_sink_read_drains_at_most_count_entries(queued in 0_u32..6, count in 1_u32..6) {
        let mut sink = DprintfFifoSink::default();
        let record = DprintfRecord::new(0, b"0123456789abcdef".to_vec()).expect("printable");
        for _ in 0..queued {
            sink.push_record(&record).expect("room");
        }
        let script = DebugScript::new().with(ScriptOp::read(64, count).expect("valid shape"));
        let outcome = invoke_script(&mut sink, SessionConfig::default(), &script)
            .expect("sink idle");

        let drained = queued.min(count);
        prop_assert!(outcome.completion.is_ok());
        prop_assert_eq!(outcome.data_returned.len() as u32, drained * 2);
        prop_assert_eq!(sink.status().entries_full(), queued - drained);
    }

    #[test]
    fn property_maximal_register_never_sticks(nbits in 2_u8..=20, steps in 0_u64..512) {
        let mut lfsr = Lfsr::maximal(nbits).expect("table entry");
        lfsr.clk(steps);
        prop_assert_ne!(lfsr.value(), 0);
        prop_assert_eq!(lfsr.value() >> nbits, 0);
    }
}
