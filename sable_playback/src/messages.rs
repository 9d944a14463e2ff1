//! Protocol lines the module generates itself.

macro_rules! define_messages {
    (
        $( $name:ident => { ( $( $arg:ident : $argtype:ty ),* ) => $format:literal } ),* $(,)?
    ) => {
        $(
            #[derive(Debug, Clone, PartialEq, Eq)]
            pub struct $name(String);

            impl $name
            {
                pub fn new( $( $arg: $argtype ),* ) -> Self
                {
                    Self(format!($format, $( $arg = $arg ),* ))
                }

                pub fn as_str(&self) -> &str
                {
                    &self.0
                }
            }

            impl std::fmt::Display for $name
            {
                fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
                {
                    f.write_str(&self.0)
                }
            }

            impl From<$name> for String
            {
                fn from(msg: $name) -> String { msg.0 }
            }
        )*
    };
}

define_messages! {
    Privmsg => { (source: &str, target: &str, message: &str)    => ":{source} PRIVMSG {target} :{message}" },
    Notice  => { (source: &str, target: &str, message: &str)    => ":{source} NOTICE {target} :{message}" },
    Action  => { (source: &str, target: &str, message: &str)    => ":{source} PRIVMSG {target} :\x01ACTION {message}\x01" },

    // IRCv3 standard replies
    Fail    => { (command: &str, code: &str, context: &str, description: &str)
                                => "FAIL {command} {code} {context} :{description}" },
}
