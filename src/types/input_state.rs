/// Whether the input control accepts new submissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputState {
    /// Input is enabled.
    #[default]
    Ready,

    /// A request is in flight; input is disabled.
    AwaitingReply,
}

