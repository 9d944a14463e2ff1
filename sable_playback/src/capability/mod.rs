use itertools::Itertools;
use strum::{EnumIter, IntoEnumIterator};

mod registry;
pub use registry::*;

pub mod server_time;

macro_rules! define_capabilities {
    (
        $typename:ident
        {
            $( $cap:ident : $val:literal => ($name:literal, $param:literal) ),*
        }
    ) => {
        #[derive(Clone,Copy,Debug,PartialEq,Eq,Hash)]
        #[derive(EnumIter)]
        #[repr(u64)]
        pub enum $typename
        {
            $( $cap = $val ),*
        }

        impl $typename
        {
            /// On-the-wire name of the capability
            pub fn name(self) -> &'static str
            {
                match self
                {
                    $( Self::$cap => $name ),*
                }
            }

            /// Whether a client may append `/<value>` to the name when requesting it
            pub fn is_parameterised(self) -> bool
            {
                match self
                {
                    $( Self::$cap => $param ),*
                }
            }

            /// Bit used as a mask in [`ClientCapabilitySet`]
            pub fn flag(self) -> u64
            {
                self as u64
            }
        }
    };
}

define_capabilities! (
    ClientCapability
    {
        Playback:           0x01 => ("znc.in/playback", false),
        SmartPlayback:      0x02 => ("znc.in/smartplayback", true),
        ServerTime:         0x04 => ("server-time", false),
        EchoMessage:        0x08 => ("echo-message", false)
    }
);

impl ClientCapability {
    /// Identify the capability named in a client request, along with any parameter
    /// given after it.
    ///
    /// `znc.in/smartplayback/1400000000` yields `(SmartPlayback, Some("1400000000"))`.
    pub fn from_request(requested: &str) -> Option<(Self, Option<&str>)> {
        Self::iter().find_map(|cap| {
            let rest = requested.strip_prefix(cap.name())?;
            if rest.is_empty() {
                Some((cap, None))
            } else if cap.is_parameterised() {
                rest.strip_prefix('/').map(|param| (cap, Some(param)))
            } else {
                None
            }
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClientCapabilitySet(u64);

impl ClientCapabilitySet {
    pub fn new() -> Self {
        Self(0)
    }

    /// A set containing every known capability
    pub fn all() -> Self {
        ClientCapability::iter().collect()
    }

    pub fn has(&self, cap: ClientCapability) -> bool {
        0 != self.0 & cap.flag()
    }

    pub fn has_all(&self, caps: ClientCapabilitySet) -> bool {
        (self.0 & caps.0) == caps.0
    }

    pub fn has_any(&self, caps: ClientCapabilitySet) -> bool {
        (self.0 & caps.0) != 0
    }

    pub fn set(&mut self, cap: ClientCapability) {
        self.0 |= cap.flag();
    }

    pub fn unset(&mut self, cap: ClientCapability) {
        self.0 &= !cap.flag();
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = ClientCapability> + '_ {
        ClientCapability::iter().filter(|cap| self.has(*cap))
    }
}

impl From<ClientCapability> for ClientCapabilitySet {
    fn from(cap: ClientCapability) -> Self {
        Self(cap.flag())
    }
}

impl FromIterator<ClientCapability> for ClientCapabilitySet {
    fn from_iter<I: IntoIterator<Item = ClientCapability>>(iter: I) -> Self {
        let mut set = Self::new();
        for cap in iter {
            set.set(cap);
        }
        set
    }
}

impl std::fmt::Display for ClientCapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.iter().map(ClientCapability::name).join(" "))
    }
}
