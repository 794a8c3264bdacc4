//! Closed catalogue of joints a mobility test can target.
//!
//! Each joint is a value, not a code path: the session state machine is the
//! same for all of them, and the per-joint differences are the label and the
//! instruction text looked up here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestIdentifier {
    #[serde(rename = "Left Ankle")]
    LeftAnkle,
    #[serde(rename = "Right Ankle")]
    RightAnkle,
    #[serde(rename = "Left Elbow")]
    LeftElbow,
    #[serde(rename = "Right Elbow")]
    RightElbow,
}

impl TestIdentifier {
    pub const ALL: [TestIdentifier; 4] = [
        TestIdentifier::LeftAnkle,
        TestIdentifier::RightAnkle,
        TestIdentifier::LeftElbow,
        TestIdentifier::RightElbow,
    ];

    /// Display and persisted name.
    pub fn label(self) -> &'static str {
        match self {
            TestIdentifier::LeftAnkle => "Left Ankle",
            TestIdentifier::RightAnkle => "Right Ankle",
            TestIdentifier::LeftElbow => "Left Elbow",
            TestIdentifier::RightElbow => "Right Elbow",
        }
    }

    /// Kebab-case form used on the command line and in export file names.
    pub fn slug(self) -> &'static str {
        match self {
            TestIdentifier::LeftAnkle => "left-ankle",
            TestIdentifier::RightAnkle => "right-ankle",
            TestIdentifier::LeftElbow => "left-elbow",
            TestIdentifier::RightElbow => "right-elbow",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TestIdentifier::LeftAnkle => ANKLE_LEFT,
            TestIdentifier::RightAnkle => ANKLE_RIGHT,
            TestIdentifier::LeftElbow => ELBOW_LEFT,
            TestIdentifier::RightElbow => ELBOW_RIGHT,
        }
    }
}

const ANKLE_LEFT: &str = "This test measures the range of motion of the left ankle.

Instructions:
    1. Sit down on a chair and elevate your left foot slightly above the ground.
    2. Strap the sensor band(s) around the middle of your left foot.
    3. Start the test.
    4. While keeping your left leg stationary, move your left foot around as much as possible until the test is completed.
    5. Check your results and see how they compare to previous results!";

const ANKLE_RIGHT: &str = "This test measures the range of motion of the right ankle.

Instructions:
    1. Sit down on a chair and elevate your right foot slightly above the ground.
    2. Strap the sensor band(s) around the middle of your right foot.
    3. Start the test.
    4. While keeping your right leg stationary, move your right foot around as much as possible until the test is completed.
    5. Check your results and see how they compare to previous results!";

const ELBOW_LEFT: &str = "This test measures the flexibility and strength of the left elbow.

Instructions:
    1. Strap the sensor band(s) around the middle of your left forearm.
    2. Start the test.
    3. While keeping your upper arm stationary, extend (hand away from you) and retract (hand towards you) your lower arm as much as possible until the test is completed.
    4. Check your results and see how they compare to previous results!";

const ELBOW_RIGHT: &str = "This test measures the flexibility and strength of the right elbow.

Instructions:
    1. Strap the sensor band(s) around the middle of your right forearm.
    2. Start the test.
    3. While keeping your upper arm stationary, extend (hand away from you) and retract (hand towards you) your lower arm as much as possible until the test is completed.
    4. Check your results and see how they compare to previous results!";

impl fmt::Display for TestIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown joint {0:?} (expected one of: left-ankle, right-ankle, left-elbow, right-elbow)")]
pub struct UnknownJoint(pub String);

impl FromStr for TestIdentifier {
    type Err = UnknownJoint;

    /// Accepts the display name ("Left Ankle") or the slug ("left-ankle"),
    /// ignoring ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TestIdentifier::ALL
            .into_iter()
            .find(|id| {
                id.label().eq_ignore_ascii_case(wanted) || id.slug().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownJoint(s.to_string()))
    }
}
