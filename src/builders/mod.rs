// This file is the module declaration file for the `builders` module.
// It declares and makes public all the sub-modules within the `src/builders`
// directory. These modules turn preference values into strings and back,
// persist them, and check or render them.

// The `pub mod codec;` declaration exposes the `codec` module.
//
// `codec` module:
// The flat text encodings of every preference value: `;`-joined rule
// exclusions with base64 display names, and CRLF-joined file exclusions and
// extra properties. Decoding drops malformed segments instead of failing.
pub mod codec;

// The `pub mod patterns;` declaration exposes the `patterns` module.
//
// `patterns` module:
// Compiles path globs such as `**/test/**/*` into regular expressions. Used
// to recognise test files from the `testFileRegexps` preference.
pub mod patterns;

// The `pub mod reporter;` declaration exposes the `reporter` module.
//
// `reporter` module:
// Defines the `StatusReporter` trait and its `ConsoleReporter`
// implementation, which renders the configured exclusions for the `list-*`
// commands.
pub mod reporter;

// The `pub mod storage;` declaration exposes the `storage` module.
//
// `storage` module:
// Defines the `PreferenceStore` trait (get/set/remove/flush) and its
// `FilePreferences` and `MemoryPreferences` implementations.
pub mod storage;

// The `pub mod validator;` declaration exposes the `validator` module.
//
// `validator` module:
// Defines the `ExclusionValidator` trait and a `StandardValidator` that
// reports values the codec cannot store faithfully, such as rule keys
// containing `:`.
pub mod validator;
