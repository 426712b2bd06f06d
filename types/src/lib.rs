pub mod api;
pub use api::{ErrorBody, DICE_PATH, PlayRequest, PlayResponse};
pub mod game;
pub use game::{
    is_valid_face, payout, ParseParityError, Parity, CHIP_PRESETS, CHIP_STEP, DEFAULT_BET,
    FACES, MIN_BET,
};
