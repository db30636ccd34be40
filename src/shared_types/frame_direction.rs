/// Which side of the bus originated a captured frame.
///
/// The command wrapper decoder only looks at `Request` frames. Anything the
/// device sends back (data-in, status) arrives as `Response`.
///
/// - `Request`: host-originated, e.g. a bulk OUT submission.
/// - `Response`: device-originated or a completion echoed by the host controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameDirection {
    /// Frame sent by the host (the initiator).
    Request,

    /// Frame sent by the device (the target).
    Response,
}

impl FrameDirection {
    pub fn is_request(self) -> bool {
        matches!(self, FrameDirection::Request)
    }
}
