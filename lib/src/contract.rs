//! Bindings for the issuing contract and receipt-log helpers.

use alloy::primitives::{Address, Log, U256};
use alloy::sol;
use alloy_sol_types::SolEvent;

use crate::TokenId;

sol! {
    /// Consumed interface of the encrypted-message ERC-721 collection.
    /// `externalEuint256` handles are `bytes32` at the ABI level.
    #[sol(rpc)]
    interface IEncryptedNft {
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);

        function mint(bytes32 encryptedMessage, bytes calldata inputProof, string calldata imageURI) external returns (uint256);
        function transferFrom(address from, address to, uint256 tokenId) external;
        function getEncryptedMessage(uint256 tokenId) external view returns (bytes32);
        function getImageURI(uint256 tokenId) external view returns (string memory);
        function tokensOwnedBy(address owner) external view returns (uint256[] memory);
    }
}

/// Convert an on-chain token id, rejecting values beyond `u64`.
pub fn token_id_from_u256(value: U256) -> Option<TokenId> {
    u64::try_from(value).ok()
}

/// Find the id minted by `contract` in a receipt's logs.
///
/// A mint is the ERC-721 `Transfer` whose `from` is the zero address; when
/// several are present the last one wins.
pub fn minted_token_id(contract: Address, logs: &[Log]) -> Option<TokenId> {
    logs.iter()
        .filter(|log| log.address == contract)
        .filter_map(|log| IEncryptedNft::Transfer::decode_log(log).ok())
        .filter(|event| event.data.from == Address::ZERO)
        .filter_map(|event| token_id_from_u256(event.data.tokenId))
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const NFT: Address = address!("1111111111111111111111111111111111111111");
    const ALICE: Address = address!("00000000000000000000000000000000000a11ce");

    fn transfer_log(emitter: Address, from: Address, to: Address, token_id: u64) -> Log {
        let event = IEncryptedNft::Transfer {
            from,
            to,
            tokenId: U256::from(token_id),
        };
        Log {
            address: emitter,
            data: event.encode_log_data(),
        }
    }

    #[test]
    fn test_minted_token_id_from_transfer_event() {
        let logs = vec![transfer_log(NFT, Address::ZERO, ALICE, 3)];
        assert_eq!(minted_token_id(NFT, &logs), Some(3));
    }

    #[test]
    fn test_ignores_other_contracts_and_plain_transfers() {
        let other = address!("2222222222222222222222222222222222222222");
        let logs = vec![
            transfer_log(other, Address::ZERO, ALICE, 9),
            transfer_log(NFT, ALICE, other, 4),
        ];
        assert_eq!(minted_token_id(NFT, &logs), None);
    }

    #[test]
    fn test_token_id_range() {
        assert_eq!(token_id_from_u256(U256::from(5u64)), Some(5));
        assert_eq!(token_id_from_u256(U256::MAX), None);
    }
}
