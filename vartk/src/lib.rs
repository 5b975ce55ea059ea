#[cfg(feature = "core")]
#[doc(inline)]
pub use vartk_core as core;

#[cfg(feature = "refseq")]
#[doc(inline)]
pub use vartk_refseq as refseq;

#[cfg(feature = "consensus")]
#[doc(inline)]
pub use vartk_consensus as consensus;
