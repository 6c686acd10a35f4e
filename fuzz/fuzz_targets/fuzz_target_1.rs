#![no_main]

use libfuzzer_sys::fuzz_target;
use texcore::chars::InputSource;
use texcore::env::Environment;
use texcore::mouth::Mouth;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let mut env = Environment::new("fuzz");
        env.inputs.push(InputSource::new(s, None));
        let mut mouth = Mouth::new();

        // Bound iteration count: a pathological input (e.g. deeply nested
        // macro recursion) should error out, not hang the fuzzer.
        for _ in 0..10_000 {
            match mouth.read(&mut env) {
                Ok(Some(_)) => continue,
                Ok(None) | Err(_) => break,
            }
        }
    }
});
