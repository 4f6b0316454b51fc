// state local to tui, mirrors what the keys need to know to resolve
// themselves into semantic inputevents; synced from DisplayState per loop
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub playing: bool,
    pub processing: bool, // export queued, knobs and transport wait
}
