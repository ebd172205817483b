cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        compile_error!("meshsync_shared currently ships only a native time backend");
    } else {
        mod native;
        pub use native::*;
    }
}
