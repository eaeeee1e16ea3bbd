//! Burner router trait definitions

use crate::id::Address;

/// Routes slashed collateral to a receiver
///
/// Receivers resolve from the most specific configuration to the least:
/// operator-network, then network, then the global receiver.
pub trait BurnerRouter {
    fn collateral(&self) -> Address;

    fn global_receiver(&self) -> Address;

    /// Delay in seconds before a receiver or delay change may be accepted
    fn delay(&self) -> u64;

    fn network_receiver(&self, network: Address) -> Option<Address>;

    fn operator_network_receiver(&self, network: Address, operator: Address) -> Option<Address>;

    /// Receiver of collateral slashed from `operator` on `network`
    fn receiver_for(&self, network: Address, operator: Address) -> Address {
        self.operator_network_receiver(network, operator)
            .or_else(|| self.network_receiver(network))
            .unwrap_or_else(|| self.global_receiver())
    }
}
