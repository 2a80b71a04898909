pub mod consensus {
    //!
    //! A module for constants which directly impact consensus.
    //!

    use rapids_math::Uint256;

    //
    // ~~~~~~~~~~~~~~~~~~~~~~~~~ Amounts ~~~~~~~~~~~~~~~~~~~~~~~~~
    //

    /// Number of base units in one coin
    pub const COIN: u64 = 100_000_000;

    /// Denominator of reward split fractions
    pub const BASIS_POINTS: u32 = 10_000;

    //
    // ~~~~~~~~~~~~~~~~~~~~~~~~~ Target limits ~~~~~~~~~~~~~~~~~~~~~~~~~
    //

    /// Proof of work ceiling of the public networks: `~0 >> 2`
    pub const POW_LIMIT: Uint256 = Uint256([u64::MAX, u64::MAX, u64::MAX, u64::MAX >> 2]);

    /// Proof of stake ceiling of the public networks: `~0 >> 24`
    pub const POS_LIMIT: Uint256 = Uint256([u64::MAX, u64::MAX, u64::MAX, u64::MAX >> 24]);

    /// Proof of stake ceiling after the PoS v2 upgrade: `~0 >> 20`. Also the regtest ceiling for both proof types.
    pub const POS_LIMIT_V2: Uint256 = Uint256([u64::MAX, u64::MAX, u64::MAX, u64::MAX >> 20]);

    //
    // ~~~~~~~~~~~~~~~~~~~ Difficulty Adjustment ~~~~~~~~~~~~~~~~~~~
    //

    /// Number of blocks averaged by the windowed retarget
    pub const LWMA_WINDOW: u64 = 15;

    /// Number of most recent solve times inspected by the jump rule
    pub const LWMA_JUMP_WINDOW: u64 = 3;

    /// The jump rule fires when the recent solve times sum below `NUMERATOR / DENOMINATOR` of their
    /// expected sum (i.e. 0.8)
    pub const LWMA_JUMP_THRESHOLD_NUMERATOR: u64 = 8;
    pub const LWMA_JUMP_THRESHOLD_DENOMINATOR: u64 = 10;

    /// Per-block percentage of the jump adjustment, applied as `N * 26 / 200` percent
    pub const LWMA_JUMP_FACTOR_NUMERATOR: u64 = 26;
    pub const LWMA_JUMP_FACTOR_DENOMINATOR: u64 = 200;

    /// Solve times are capped at this multiple of the target spacing
    pub const LWMA_MAX_SOLVETIME_FACTOR: u64 = 6;

    /// The legacy retarget caps the observed spacing at this multiple of the target spacing
    pub const LEGACY_MAX_SPACING_FACTOR: u64 = 10;

    //
    // ~~~~~~~~~~~~~~~~~~~ Parameter bounds ~~~~~~~~~~~~~~~~~~~
    //
    // Timing parameters are bounded so that every intermediate of the retarget formulas fits in the
    // 320 bit working type.

    /// Highest accepted target spacing or timespan (seconds)
    pub const MAX_TIMING_PARAM: u64 = u32::MAX as u64;

    /// Highest accepted averaging window of the windowed retarget
    pub const MAX_AVERAGING_WINDOW: u64 = 1024;
}
