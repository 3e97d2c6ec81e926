fn main() {
    // Host builds need no ESP-IDF environment; the device build forwards the
    // sysenv so the ESP-IDF bindings can locate the toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
