#![no_main]

use dprintf_core::{
    render, DebugMasterSession, DebugScript, DprintfFifoSink, DprintfRecord, FifoStatus,
    SessionConfig, SinkConfig,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let (split, rest) = data.split_at(1);
    let at = usize::from(split[0]).min(rest.len());
    let (program, script) = rest.split_at(at);

    let _ = render(program);
    let _ = DebugScript::decode(script);
    let _ = FifoStatus::unpack(u32::from_le_bytes([
        data[0],
        data[1],
        *data.get(2).unwrap_or(&0),
        *data.get(3).unwrap_or(&0),
    ]));

    let mut sink = DprintfFifoSink::new(SinkConfig { capacity: 4 });
    if let Ok(record) = DprintfRecord::new(0, program.to_vec()) {
        let _ = sink.push_record(&record);
    }
    let config = SessionConfig {
        tick_budget: 256,
        ..SessionConfig::default()
    };
    let mut idle = script.iter().copied().cycle();
    let _ = DebugMasterSession::new(&mut sink, config).run(script, || {
        u32::from(idle.next().unwrap_or(0) & 3)
    });
});
