/// A device hanging off an 8-bit parallel port.
///
/// The port controller calls `write` every time the host changes the output
/// pins and `read` whenever the host samples the input pins. A peripheral only
/// owns the pins named in `pin_mask`; the controller ignores any other bits it
/// returns from `read`.
pub trait ParallelPeripheral {
    /// Bits of the port this peripheral is wired to.
    fn pin_mask(&self) -> u8;

    /// Current level of the pins driven by the peripheral, in port form.
    fn read(&self) -> u8;

    /// Observe a new snapshot of the port pins.
    fn write(&mut self, data: u8);

    fn shutdown(&mut self) {}

    fn name(&self) -> String;
}
