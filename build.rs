fn main() {
    // ESP-IDF link/env propagation is only needed for the firmware build.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
