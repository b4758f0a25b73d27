use proptest::prelude::*;

use crate::models::PlayerProfile;

/// Profiles whose point-win chance on serve stays strictly inside (0, 1).
pub(crate) fn playable_profile() -> impl Strategy<Value = PlayerProfile> {
    (
        0.05f64..=0.95,
        0.05f64..=0.95,
        0.05f64..=0.95,
        0.0f64..=1.0,
        0.0f64..=1.0,
        0.05f64..=0.95,
    )
        .prop_map(|(first_in, first_won, second_won, ace_share, df_share, ret)| {
            PlayerProfile::new(
                "P",
                first_in,
                first_won,
                second_won,
                ace_share * first_in,
                df_share * (1.0 - first_in),
                ret,
            )
        })
}
