#![no_main]

use libfuzzer_sys::fuzz_target;
use tk64_core::{
    load_image, step_one, validate_data_access, validate_fetch_access, AlignmentPolicy,
    CoreConfig, Decoder, StreamPorts, MEMORY_CAPACITY,
};

fuzz_target!(|data: &[u8]| {
    if data.len() < 12 {
        return;
    }

    let word = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let addr = i64::from_le_bytes([
        data[4], data[5], data[6], data[7], data[8], data[9], data[10], data[11],
    ]);

    let _ = Decoder::decode(word);

    let config = CoreConfig::default();
    if let Ok(mut machine) = load_image(&word.to_le_bytes(), &config) {
        machine.arch.set_gpr(tk64_core::GeneralRegister::from_u5(data[4]), addr as u64);
        let mut ports = StreamPorts::new(&data[12..], Vec::new());
        let _ = step_one(&mut machine, &mut ports, &config);
        let _ = step_one(&mut machine, &mut ports, &config);
        let _ = validate_fetch_access(machine.arch.pc(), machine.image);
    }

    let _ = validate_data_access(addr, AlignmentPolicy::BoundsOnly, MEMORY_CAPACITY);
    let _ = validate_data_access(addr, AlignmentPolicy::Natural, MEMORY_CAPACITY);
});
